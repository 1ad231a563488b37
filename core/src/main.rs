use anyhow::bail;
use pokedex_core::{logging, ApiError, CollectionSnapshot, Config, Session};

const USAGE: &str = "usage: pokedex list [PAGES] [--json] | pokedex search NAME [--json]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let config = Config::from_env()?;

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = match args.iter().position(|a| a == "--json") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };

    let session = Session::connect(&config);
    let outcome = match args.first().map(String::as_str) {
        Some("list") => {
            let pages: usize = match args.get(1) {
                Some(n) => n.parse()?,
                None => 1,
            };
            list(&session, pages).await
        }
        Some("search") => match args.get(1) {
            Some(name) => session.search(name).await,
            None => bail!(USAGE),
        },
        _ => bail!(USAGE),
    };

    if let Err(e) = outcome {
        let Some(alert) = e.alert() else {
            return Err(e.into());
        };
        tracing::debug!(error = %e, "operation failed");
        eprintln!("{}: {}", alert.title(), alert.message());
        std::process::exit(1);
    }

    let snapshot = session.snapshot().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_table(&snapshot);
    }
    Ok(())
}

async fn list(session: &Session, pages: usize) -> Result<(), ApiError> {
    session.load_first_page().await?;
    for _ in 1..pages {
        match session.load_next_page().await {
            Ok(()) => {}
            Err(ApiError::NoMorePages) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn print_table(snapshot: &CollectionSnapshot) {
    for item in &snapshot.items {
        match &item.detail {
            Some(detail) => {
                let types: Vec<&str> = detail.categories.iter().map(|c| c.name.as_str()).collect();
                println!("#{:<5} {:<16} {}", detail.id, item.name, types.join("/"));
            }
            None => println!("{:<6} {:<16} (no detail)", "?", item.name),
        }
    }
    if let Some(total) = snapshot.total_count {
        println!("{} of {total} loaded", snapshot.len());
    }
}

use std::process;
use std::sync::Arc;

use flashcards_app::{Database, Result, Services};
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let database = match start_database() {
        Ok(database) => Arc::new(database),
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Failed to start flashcards: {}", e);
            process::exit(1);
        }
    };

    let services = Services::new(Arc::clone(&database));
    if let Err(e) = print_summary(&services) {
        eprintln!("Failed to load decks: {}", e);
        database.shutdown();
        process::exit(1);
    }

    database.shutdown();
}

fn start_database() -> Result<Database> {
    let database = Database::load()?;

    database.check_connection()?;
    database.initialize_database()?;
    Ok(database)
}

fn print_summary(services: &Services) -> Result<()> {
    let decks = services.deck_service().get_all_decks()?;
    let total_cards = services.card_service().get_total_card_count()?;

    println!("Loaded {} decks ({} cards) from database", decks.len(), total_cards);
    for deck in &decks {
        println!("  - {}", deck);
    }
    Ok(())
}

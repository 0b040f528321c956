use dotenvy::dotenv;
use library_system::{
    config::{database, seed::load_seed, settings::load_default_settings},
    core::{lending, report, seed::seed_if_empty},
    errors::Result,
    listing::BookListing,
    session::LibraryContext,
};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();

    // 3. Settings from library.toml (or LIBRARY_CONFIG) plus DATABASE_URL
    let settings = load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!(
        loan_period_days = settings.loan_period_days,
        page_size = settings.page_size,
        "Settings loaded"
    );

    // 4. Database and schema
    let db = database::init_database(&settings.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Demonstration data on first run
    if settings.seed_on_empty {
        if Path::new(&settings.seed_file).exists() {
            let seed = load_seed(&settings.seed_file)?;
            seed_if_empty(&db, &seed)
                .await
                .inspect_err(|e| error!("Failed to seed database: {}", e))?;
        } else {
            warn!(seed_file = %settings.seed_file, "Seed file not found, skipping");
        }
    }

    // 6. Start-up summary
    let ctx = LibraryContext::new(db, settings);
    let books = BookListing::load(&ctx.db, ctx.settings.page_size).await?;
    let checked_out = lending::checked_out_copies(&ctx.db).await?;
    let overdue = report::overdue_copies(&ctx.db, ctx.today()).await?;
    info!(
        books = books.listing().len(),
        checked_out = checked_out.len(),
        overdue = overdue.len(),
        "Library ready"
    );

    Ok(())
}

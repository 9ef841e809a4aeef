use clap::Parser;
use filedrop_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    let (_state, router) = filedrop_api::setup::initialize_app(config.clone()).await?;

    filedrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}

use pwa_devtools::config::Config;
use pwa_devtools::logger;
use pwa_devtools::server::{browser, signal, startup, PwaServer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging)?;

    // Serve from the project directory regardless of where we were launched
    startup::enter_root(&cfg.server.root)?;
    startup::init_console();

    // One thread, one connection at a time
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::current_dir()?;
    let server = PwaServer::bind(&cfg, root)?;
    let port = server.local_addr()?.port();

    startup::print_banner(port);

    if cfg.server.open_browser {
        // Not having a browser is fine; the URL is in the banner
        let _ = browser::open_in_browser(&cfg.local_url());
    }

    server.serve(signal::interrupt()).await;
    logger::log_info("\n👋 Server stopped");
    Ok(())
}

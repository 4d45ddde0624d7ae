fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging for development
    env_logger::init();

    // File dialogs run on tokio tasks, so the app needs a runtime entered
    // for the lifetime of the event loop.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    uml_canvas::run_app()?;
    Ok(())
}

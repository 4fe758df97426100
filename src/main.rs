use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use evalfn::api::{configure_routes, AppState};
use evalfn::config::AppConfig;
use evalfn::dispatch::Dispatcher;
use evalfn::function::ExactMatch;
use evalfn::banner;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  No .env file loaded: {}", e);
    }

    let app_config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&app_config.log_filter));

    // The one comparison routine this build serves.
    let dispatcher = Dispatcher::new(Arc::new(ExactMatch), app_config.docs.clone());
    banner::print_banner(dispatcher.function_name());

    if let Some(limit) = app_config.eval_timeout {
        log::info!("evaluation timeout: {}ms", limit.as_millis());
    }

    let bind = (app_config.host.clone(), app_config.port);
    let state = AppState::new(app_config, dispatcher);

    println!("🚀 Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}

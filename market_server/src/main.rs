use dotenvy::dotenv;
use log::info;
use market_server::{
    cli::{handle_command_line_args, Command},
    config::ServerConfig,
    server::run_server,
    watch::watch_user,
};

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let command = handle_command_line_args();
    let config = ServerConfig::from_env_or_default();

    let result = match command {
        Command::Serve => {
            info!("🚀️ Starting server on {}:{}", config.host, config.port);
            run_server(config).await
        },
        Command::Watch(user) => watch_user(config, user).await,
        Command::Exit => return,
    };
    match result {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}

use lingo_common::chat::{ChatProvider, HmacChatProvider};
use lingo_common::db::create_db_thread_pool;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, Naming, WriteMode,
};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};

mod env;
mod handlers;
mod middleware;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    let mut port = 5001u16;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                port = match args.next().as_deref().map(str::parse::<u16>) {
                    Some(Ok(p)) => p,
                    Some(Err(_)) => {
                        eprintln!("ERROR: Incorrect format for port. Integer expected");
                        std::process::exit(1);
                    }
                    None => {
                        eprintln!("ERROR: --port option specified but no port was given");
                        std::process::exit(1);
                    }
                };
            }
            "--ip" => {
                ip = match args.next().as_deref().map(str::parse::<IpAddr>) {
                    Some(Ok(i)) => i,
                    Some(Err(_)) => {
                        eprintln!("ERROR: Invalid IP address");
                        std::process::exit(1);
                    }
                    None => {
                        eprintln!("ERROR: --ip option specified but no IP was given");
                        std::process::exit(1);
                    }
                };
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let base_addr = format!("{}:{}", &ip, &port);
    env::initialize();

    let _logger = Logger::with(LogSpecification::info())
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let cpu_count = num_cpus::get();

    let actix_workers = env::CONF.actix_worker_count.unwrap_or(cpu_count);
    let db_workers = env::CONF
        .db_max_connections
        .unwrap_or(cpu_count as u32 * 4);

    // To prevent resource starvation, max connections must be at least as
    // large as the number of actix workers
    let db_max_connections = if actix_workers > db_workers as usize {
        actix_workers as u32
    } else {
        db_workers
    };

    log::info!("Connecting to database...");

    let db_thread_pool = create_db_thread_pool(env::CONF.database_uri.as_str(), db_max_connections);

    log::info!("Successfully connected to database");

    let chat_provider: Box<dyn ChatProvider> = Box::new(HmacChatProvider::new(
        &env::CONF.keys.chat_provider_secret,
        env::CONF.lifetimes.chat_token_lifetime,
    ));
    let chat_provider = Data::new(chat_provider);

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db_thread_pool.clone()))
            .app_data(chat_provider.clone())
            .configure(services::api::configure)
            .wrap(middleware::cors::CorsMiddleware::default())
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    Ok(())
}

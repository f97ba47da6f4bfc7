use question_analyzer::models::config::AnalyzerConfig;
use question_analyzer::processing::AnalyzerMessage;
use question_analyzer::processing::analyze::process_analyze_message;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match AnalyzerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let context = zmq::Context::new();
    let responder = context.socket(zmq::PULL).expect("Cannot create zmq socket");
    responder
        .bind(&config.zmq_address)
        .expect("Cannot bind to zmq port");

    loop {
        let msg = match responder.recv_bytes(0) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Failed to receive message: {e}");
                continue;
            }
        };
        match serde_json::from_slice::<AnalyzerMessage>(&msg) {
            // One batch is clustered start-to-finish before the next message
            // is read.
            Ok(AnalyzerMessage::Analyze(request)) => {
                process_analyze_message(request, &config).await;
            }
            Err(e) => log::error!("Failed to parse JSON: {e}"),
        }
    }
}

use crate::adapters::{DynamoDbRegistrationStore, PostmarkEmailClient};
use crate::configuration::{DatabaseSettings, Settings};
use crate::domain::{EmailClient, Notifier, RegistrationStore};
use crate::routes::{health_check, home, register};
use actix_web::dev::{Server, Service};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::web::Data;
use actix_web::{web, App, HttpMessage, HttpServer};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::config::Credentials;
use std::net::TcpListener;
use std::sync::Arc;
use telemetry::CustomLevelRootSpanBuilder;
use tracing_actix_web::{RequestId, TracingLogger};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.application.host_name, configuration.application.port
        ))?;
        let port = listener.local_addr()?.port();

        let store = DynamoDbRegistrationStore::new(
            get_dynamodb_client(&configuration.database).await,
            configuration.database.table_name.clone(),
            configuration.database.timeout(),
        );

        let email_settings = configuration.email_client;
        let email_client = PostmarkEmailClient::new(
            email_settings.base_url.clone(),
            email_settings.sender_email.clone(),
            email_settings.authorization_token.clone(),
            email_settings.timeout(),
        )?;

        let server = run(listener, store, email_client, email_settings.operator_email)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run<S, E>(
    listener: TcpListener,
    store: S,
    email_client: E,
    operator_email: String,
) -> Result<Server, std::io::Error>
where
    S: RegistrationStore + Clone + Send + 'static,
    E: EmailClient + Clone + Send + 'static,
{
    let server = HttpServer::new(move || {
        let store_arc: Arc<dyn RegistrationStore> = Arc::new(store.clone());
        let store_data: Data<dyn RegistrationStore> = Data::from(store_arc);

        let email_client_arc: Arc<dyn EmailClient> = Arc::new(email_client.clone());
        let notifier_data = Data::new(Notifier::new(email_client_arc, operator_email.clone()));

        App::new()
            .wrap_fn(|req, srv| {
                let request_id = req.extensions().get::<RequestId>().copied();
                let res = srv.call(req);
                async move {
                    let mut res = res.await?;
                    if let Some(request_id) = request_id {
                        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                            res.headers_mut()
                                .insert(HeaderName::from_static("x-request-id"), value);
                        }
                    }
                    Ok(res)
                }
            })
            .wrap(TracingLogger::<CustomLevelRootSpanBuilder>::new())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .service(web::scope("/api").route("/register", web::post().to(register)))
            .app_data(store_data)
            .app_data(notifier_data)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn get_dynamodb_client(settings: &DatabaseSettings) -> aws_sdk_dynamodb::Client {
    let region = Region::new(settings.region.clone());

    let conf = match &settings.endpoint {
        Some(endpoint) => aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(Credentials::new("local", "local", None, None, "local"))
            .endpoint_url(endpoint)
            .build(),
        None => {
            let shared_config = aws_config::defaults(BehaviorVersion::latest())
                .region(region)
                .load()
                .await;
            aws_sdk_dynamodb::config::Builder::from(&shared_config).build()
        }
    };

    aws_sdk_dynamodb::Client::from_conf(conf)
}

use std::error::Error;
use std::sync::Arc;

use beanbag::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut container = Container::new();
    container.install(AppModule::new("greeter"))?;
    container.property().set_default(
        "app.greeting",
        Value::from("Greeting from beanbag managed beans:"),
    );
    container.load()?;

    let app: Arc<App> = container.get("app").ok_or("app is not loaded")?;
    let greeting = container
        .property()
        .get("app.greeting")
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_default();
    app.run(&greeting);
    Ok(())
}

struct AppModule {
    app_name: &'static str,
}

impl AppModule {
    fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }
}

impl Module for AppModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        configurer
            .register(Arc::new(AppName(self.app_name)))?
            .provide_named::<ConsoleLogger>("logger")?
            .provide_named::<EnglishGreeter>("english")?
            .provide_named::<ChineseGreeter>("chinese")?
            .provide::<App>()?;
        Ok(())
    }
}

#[derive(Bean)]
struct AppName(&'static str);

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

#[derive(Default, Component)]
#[bean(implements(dyn Logger))]
struct ConsoleLogger {
    #[inject]
    pub app_name: Inject<AppName>,
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name.0, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self);
}

#[derive(Default, Component)]
#[bean(implements(dyn Greeter))]
struct EnglishGreeter {
    #[inject]
    pub logger: Inject<dyn Logger>,
}

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        self.logger.log("Hello World!");
    }
}

#[derive(Default, Component)]
#[bean(implements(dyn Greeter))]
struct ChineseGreeter {
    #[inject]
    pub logger: Inject<dyn Logger>,
}

impl Greeter for ChineseGreeter {
    fn greet(&self) {
        self.logger.log("你好世界!");
    }
}

#[derive(Default, Component)]
#[bean(implements(dyn Initialized))]
struct App {
    #[inject]
    pub logger: Inject<dyn Logger>,
    #[inject]
    pub english: Inject<dyn Greeter>,
    #[inject]
    pub chinese: Inject<dyn Greeter>,
}

impl App {
    fn run(&self, greeting: &str) {
        self.logger.log(greeting);
        self.english.greet();
        self.chinese.greet();
    }
}

impl Initialized for App {
    fn initialized(&self) -> HookResult {
        self.logger.log("application is ready");
        Ok(())
    }
}

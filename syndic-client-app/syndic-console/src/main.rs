use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use syndic_client::{App, AppContext, GateState, Route};
use syndic_core::domain::{JoinCode, Language};
use syndic_infrastructure::{
    connect_document_store, create_pool, run_migrations, FilePreferencesStore, HttpImageHost, LocalAuthProvider,
};
use syndic_shared::config::AppConfig;

#[derive(Parser)]
#[command(name = "syndic-console", version, about = "Building management client console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations to the configured PostgreSQL store
    Migrate,
    /// Join code helpers
    JoinCode {
        #[command(subcommand)]
        action: JoinCodeAction,
    },
    /// Run a scripted syndic and resident onboarding against the configured store
    Demo {
        /// Apartment name used for the syndic onboarding
        #[arg(long, default_value = "Sunset Villas")]
        apartment: String,

        #[arg(long, default_value_t = 12)]
        residents: u32,
    },
}

#[derive(Subcommand)]
enum JoinCodeAction {
    /// Print a fresh code
    Generate,
    /// Show how typed input is normalized
    Normalize { raw: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    let _guard = syndic_shared::telemetry::init_telemetry(&config.log)?;
    info!("{} starting ({})", config.app.name, config.app.env);

    match cli.command {
        Commands::Migrate => migrate(&config).await?,
        Commands::JoinCode { action } => match action {
            JoinCodeAction::Generate => println!("{}", JoinCode::generate()),
            JoinCodeAction::Normalize { raw } => match JoinCode::parse(&raw) {
                Ok(code) => println!("{}", code),
                Err(e) => {
                    error!("Rejected join code {:?}: {}", raw, e);
                    anyhow::bail!("{}", e);
                }
            },
        },
        Commands::Demo { apartment, residents } => demo(&config, &apartment, residents).await?,
    }

    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let url = config
        .store
        .url
        .as_deref()
        .context("store.url must be set to run migrations")?;
    let pool = create_pool(url, config.store.max_connections).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

async fn build_app(config: &AppConfig) -> anyhow::Result<App> {
    let store = connect_document_store(&config.store).await?;
    let ctx = AppContext::new(
        store,
        Arc::new(LocalAuthProvider::new()),
        Arc::new(HttpImageHost::new(&config.image_host)?),
        Arc::new(FilePreferencesStore::new(&config.preferences.path)),
        config.store.max_write_attempts,
    );
    let language = Language::from_code(&config.app.default_language).unwrap_or_default();
    Ok(App::new(ctx, language).await)
}

async fn pump_until(app: &mut App, what: &str, done: impl Fn(&App) -> bool) -> anyhow::Result<()> {
    while !done(app) {
        tokio::time::timeout(Duration::from_secs(30), app.next_event())
            .await
            .with_context(|| format!("timed out waiting for {}", what))?;
    }
    Ok(())
}

fn print_stack(label: &str, app: &App) {
    println!("{:<28} {:?}", label, app.gate().stack());
}

async fn register(app: &mut App, name: &str, email: &str) -> anyhow::Result<()> {
    app.navigate(Route::Register);
    app.register_vm.display_name = name.to_string();
    app.register_vm.email = email.to_string();
    app.register_vm.password = "demo-password".to_string();
    app.register_vm.confirm_password = "demo-password".to_string();
    app.register_vm.register();
    pump_until(app, "sign-up", |a| {
        a.register_vm.error.is_some()
            || (!a.register_vm.is_loading && a.gate().state() == &GateState::OnboardingIncomplete)
    })
    .await?;
    if let Some(message) = &app.register_vm.error {
        anyhow::bail!("sign-up failed: {}", message);
    }
    Ok(())
}

async fn sign_out(app: &mut App) -> anyhow::Result<()> {
    app.settings_vm.sign_out();
    pump_until(app, "sign-out", |a| a.gate().state() == &GateState::Unauthenticated).await
}

async fn demo(config: &AppConfig, apartment: &str, residents: u32) -> anyhow::Result<()> {
    let mut app = build_app(config).await?;
    print_stack("start", &app);

    // Syndic creates the building.
    register(&mut app, "Demo Syndic", "syndic@example.com").await?;
    print_stack("syndic signed up", &app);

    app.navigate(Route::CreateApartment);
    app.onboarding_vm.apartment_name = apartment.to_string();
    app.onboarding_vm.number_of_residents = residents.to_string();
    app.onboarding_vm.syndic_name = "Demo Syndic".to_string();
    app.onboarding_vm.monthly_fee = "250".to_string();
    let user = app.current_user().cloned().context("no session after sign-up")?;
    let translator = app.translator();
    app.onboarding_vm.create_apartment(&user, &translator);
    pump_until(&mut app, "apartment creation", |a| {
        a.onboarding_vm.error.is_some() || a.onboarding_vm.created.is_some()
    })
    .await?;
    if let Some(message) = &app.onboarding_vm.error {
        anyhow::bail!("apartment creation failed: {}", message);
    }
    print_stack("apartment created", &app);
    let code = match app.current_route() {
        Route::OnboardingSuccess { join_code } => join_code.clone(),
        other => anyhow::bail!("expected the success screen, got {:?}", other),
    };
    println!("join code: {}", code);

    app.refresh_status();
    pump_until(&mut app, "syndic home", |a| a.apartment_vm.data.is_some()).await?;
    print_stack("syndic home", &app);

    let syndic = app.actor().context("syndic has no membership")?;
    app.apartment_vm.resident_name = "Demo Resident".to_string();
    app.apartment_vm.resident_fee = "250".to_string();
    app.apartment_vm.add_resident(&syndic, &translator);
    pump_until(&mut app, "resident row", |a| {
        a.apartment_vm.error.is_some() || a.apartment_vm.residents().len() > 1
    })
    .await?;
    sign_out(&mut app).await?;
    print_stack("signed out", &app);

    // Resident joins with the code and claims the row.
    register(&mut app, "Demo Resident", "resident@example.com").await?;
    app.navigate(Route::JoinApartment);
    app.onboarding_vm.set_join_code(code.as_str());
    let user = app.current_user().cloned().context("no session after sign-up")?;
    app.onboarding_vm.lookup_join_code(&user, &translator);
    pump_until(&mut app, "join code lookup", |a| {
        a.onboarding_vm.error.is_some() || a.onboarding_vm.joined.is_some()
    })
    .await?;
    print_stack("join code resolved", &app);

    let resident_id = app
        .onboarding_vm
        .joined
        .as_ref()
        .and_then(|data| data.unlinked_residents().into_iter().find(|r| !r.is_syndic).map(|r| r.id.clone()))
        .context("no resident row left to claim")?;
    app.onboarding_vm.claim(&user, &resident_id);
    pump_until(&mut app, "resident home", |a| {
        a.onboarding_vm.error.is_some() || matches!(a.gate().state(), GateState::OnboardingComplete { .. })
    })
    .await?;
    print_stack("resident home", &app);
    println!("resident tabs: {:?}", app.gate().tabs());

    Ok(())
}

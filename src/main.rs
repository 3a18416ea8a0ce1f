use anyhow::Context;
use manga_studio::application_port::*;
use manga_studio::client::*;
use manga_studio::domain_model::prompt::DEFAULT_DUPLICATE_THRESHOLD;
use manga_studio::domain_model::*;
use manga_studio::logger::*;
use manga_studio::session::ApiError;
use manga_studio::settings::*;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let cancel = CancellationToken::new();
    let studio = Studio::try_new(&project_settings, cancel.clone())?;

    let result = run(&studio, cli.command).await;
    studio.shutdown().await;

    if let Err(e) = &result {
        let api_error = match e.downcast_ref::<GenerationError>() {
            Some(GenerationError::Api(api_error)) => Some(api_error),
            _ => e.downcast_ref::<ApiError>(),
        };
        if api_error.is_some_and(ApiError::is_session_expired) {
            error!("session expired, run `manga-studio login` again");
        }
    }
    result
}

async fn run(studio: &Studio, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let result = studio
                .auth_service
                .login(LoginInput { email, password })
                .await?;
            print_signed_in(result.user.as_ref());
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let result = studio
                .auth_service
                .register(RegisterInput {
                    username,
                    email,
                    password,
                })
                .await?;
            print_signed_in(result.user.as_ref());
        }
        Command::IdentityLogin { token, wallet } => {
            let result = studio
                .auth_service
                .identity_login(IdentityLoginInput {
                    identity_token: token,
                    wallet_address: wallet,
                })
                .await?;
            print_signed_in(result.user.as_ref());
        }
        Command::Logout => {
            studio.auth_service.logout().await?;
            println!("signed out");
        }
        Command::Whoami => {
            let profile = studio.auth_service.profile().await?;
            println!(
                "{} ({}) credits={} plan={}",
                profile.username,
                profile.id,
                profile.credits,
                profile.plan.as_deref().unwrap_or("-")
            );
        }
        Command::Plans => {
            for plan in studio.billing_service.plans().await? {
                println!(
                    "{:<12} {:<16} {:>6} credits  {}.{:02} {}",
                    plan.id,
                    plan.name,
                    plan.credits,
                    plan.price_cents / 100,
                    plan.price_cents % 100,
                    plan.currency
                );
            }
        }
        Command::TopUp { plan } => {
            let receipt = studio
                .billing_service
                .top_up(TopUpInput {
                    plan_id: plan,
                    payment_method: None,
                })
                .await?;
            println!(
                "added {} credits, balance {}",
                receipt.credits_added, receipt.balance
            );
            if let Some(url) = receipt.checkout_url {
                println!("complete payment at {}", url);
            }
        }
        Command::Generate {
            prompt,
            style,
            wait_secs,
            force,
        } => {
            if !force {
                let similar = studio
                    .generation_service
                    .similar_in_history(&prompt, DEFAULT_DUPLICATE_THRESHOLD)
                    .await?;
                if let Some(best) = similar.first() {
                    println!(
                        "a similar prompt was generated before ({}, {:.0}% overlap); use --force to submit anyway",
                        best.generation.id,
                        best.score * 100.0
                    );
                    return Ok(());
                }
            }
            let mut input = GenerationInput::new(prompt);
            input.style = style;
            let generation = studio.generation_service.request_generation(input).await?;
            println!("queued {}", generation.id);
            let finished = studio
                .generation_service
                .wait_for_completion(
                    generation.id,
                    Duration::from_secs(2),
                    Duration::from_secs(wait_secs),
                )
                .await?;
            print_generation(&finished);
        }
        Command::Status { id } => {
            let id: GenerationId = id.parse().context("invalid generation id")?;
            let generation = studio.generation_service.status(id).await?;
            print_generation(&generation);
        }
        Command::History { page } => {
            let history = studio.generation_service.history(Page(page)).await?;
            for generation in &history.items {
                print_generation(generation);
            }
            println!("page {}/{}", history.page, history.total_pages.max(1));
        }
        Command::Projects => {
            for project in studio.project_service.list().await? {
                println!("{}  {} ({} pages)", project.id, project.title, project.pages.len());
            }
        }
        Command::Watch => {
            if !studio.auth_service.is_signed_in() {
                return Err(anyhow::anyhow!("not signed in"));
            }
            studio.start_refresher();
            info!("keeping session fresh, press Ctrl-C to stop");
            let cancel = studio.cancellation_token();
            tokio::select! {
                _ = signal::ctrl_c() => info!("interrupted"),
                _ = cancel.cancelled() => {}
            }
        }
    }
    Ok(())
}

fn print_signed_in(user: Option<&UserProfile>) {
    match user {
        Some(user) => println!("signed in as {}", user.username),
        None => println!("signed in"),
    }
}

fn print_generation(generation: &Generation) {
    println!(
        "{}  {:?}  {}",
        generation.id, generation.status, generation.prompt
    );
    for url in &generation.image_urls {
        println!("    {}", url);
    }
    if let Some(error) = &generation.error {
        println!("    error: {}", error);
    }
}

use atelier::auth::{AuthGate, RemoteAuth};
use atelier::content::ContentRegistry;
use atelier::store::{check_server, RemoteStore};

use super::{load, prompt_line, CliError, Context};

pub async fn login(ctx: &Context, email: &str, password: Option<String>) -> Result<(), CliError> {
    let url = ctx.store_url()?;
    let password = match password {
        Some(password) => password,
        None => prompt_line("Password: ")?,
    };

    let gate = AuthGate::new(RemoteAuth::new(url), ctx.notifier.clone());
    let session = gate.sign_in(email, &password).await?;
    ctx.config.save_session(&session)?;

    println!("Signed in as {}", session.email);
    Ok(())
}

/// Signs out on the server and always forgets the local session.
pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    let Some(session) = ctx.config.load_session()? else {
        println!("Not signed in.");
        return Ok(());
    };

    let result = match ctx.config.store_url() {
        Some(url) => {
            let gate = AuthGate::new(RemoteAuth::new(url), ctx.notifier.clone());
            gate.restore(session.clone());
            gate.sign_out().await
        }
        None => Ok(()),
    };
    ctx.config.clear_session()?;

    if let Err(e) = result {
        eprintln!("Warning: {}", e);
    }
    println!("Signed out {}", session.email);
    Ok(())
}

pub async fn status(ctx: &Context) -> Result<(), CliError> {
    println!("Atelier Status");
    println!("==============");
    println!();

    let Some(url) = ctx.config.store_url() else {
        println!("Store:   Not configured (showing defaults only)");
        println!();
        println!("To connect, add to your config file:");
        println!();
        println!("  store_url: \"http://localhost:8080\"");
        println!("  project_id: \"my-studio\"");
        println!();
        println!("Or set environment variables:");
        println!("  ATELIER_STORE_URL");
        println!("  ATELIER_PROJECT_ID");
        return Ok(());
    };

    println!("Store:   {}", url);
    if let Some(project) = &ctx.config.project_id {
        println!("Project: {}", project);
    }
    println!(
        "Uploads: {}",
        if ctx.config.upload_api_key().is_some() {
            "configured"
        } else {
            "no API key"
        }
    );
    match ctx.session()?.email() {
        Some(email) => println!("Session: {}", email),
        None => println!("Session: anonymous"),
    }
    println!();

    print!("Server status: ");
    if !check_server(url).await {
        println!("✗ unreachable");
        return Ok(());
    }
    println!("✓ reachable");

    let registry = ContentRegistry::connect(RemoteStore::new(url), ctx.notifier.clone()).await;
    if load("content", registry.ready()).await.is_err() {
        println!("Content:       still loading");
    } else {
        println!("Content:       {}", registry.status());
    }
    Ok(())
}

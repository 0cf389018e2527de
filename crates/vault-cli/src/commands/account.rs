//! Register, login, logout and whoami.

use vault_core::Session;

use crate::app::{read_password, session_token_path, AppContext};
use crate::cli::AccountArgs;
use crate::output::{print_fields, print_json};
use crate::security::write_private_atomic;

pub fn handle_register(ctx: &AppContext, args: &AccountArgs) -> anyhow::Result<()> {
    let vault = ctx.vault()?;
    let password = read_password(true)?;
    let session = vault.register(&args.login, &password)?;
    store_session(&session)?;
    report(ctx, "Registered", &args.login, &session, args.json)
}

pub fn handle_login(ctx: &AppContext, args: &AccountArgs) -> anyhow::Result<()> {
    let vault = ctx.vault()?;
    let password = read_password(false)?;
    let session = vault.login(&args.login, &password)?;
    store_session(&session)?;
    report(ctx, "Logged in", &args.login, &session, args.json)
}

pub fn handle_logout(ctx: &AppContext) -> anyhow::Result<()> {
    let path = session_token_path()?;
    let removed = match std::fs::remove_file(&path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to remove session {}: {}",
                path.display(),
                e
            ))
        }
    };
    if !ctx.quiet() {
        println!("{}", if removed { "Logged out" } else { "No active session" });
    }
    Ok(())
}

pub fn handle_whoami(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let claims = ctx.claims()?;
    if json {
        return print_json(&serde_json::json!({
            "user_id": claims.user_id,
            "expires_at": claims.expires_at,
        }));
    }
    print_fields(&[
        ("User ID", claims.user_id.to_string()),
        ("Expires", claims.expires_at.to_rfc3339()),
    ]);
    Ok(())
}

fn store_session(session: &Session) -> anyhow::Result<()> {
    write_private_atomic(&session_token_path()?, session.token.as_bytes())
}

fn report(
    ctx: &AppContext,
    action: &str,
    login: &str,
    session: &Session,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        // The token itself stays in the session file.
        return print_json(&serde_json::json!({
            "login": login,
            "user_id": session.user_id,
            "expires_at": session.expires_at,
        }));
    }
    if !ctx.quiet() {
        println!(
            "{} as {} (session expires {})",
            action,
            login,
            session.expires_at.to_rfc3339()
        );
    }
    Ok(())
}

use std::io::{IsTerminal, Read};

use vault_core::{parse_record_id, TextPayload};

use crate::app::AppContext;
use crate::cli::{ShowArgs, TextCommand};
use crate::errors::CliError;
use crate::output::print_json;

pub fn handle_text(ctx: &AppContext, command: &TextCommand) -> anyhow::Result<()> {
    match command {
        TextCommand::Add { text, json } => handle_add(ctx, text.as_deref(), *json),
        TextCommand::Show(args) => handle_show(ctx, args),
        TextCommand::Delete { id } => handle_delete(ctx, id),
    }
}

fn handle_add(ctx: &AppContext, text: Option<&str>, json: bool) -> anyhow::Result<()> {
    let body = match text {
        Some(value) => value.to_string(),
        None => read_stdin()?,
    };
    let claims = ctx.claims()?;
    let receipt = ctx.vault()?.texts().create(&claims, TextPayload::new(body))?;

    if json {
        return print_json(&receipt);
    }
    if ctx.quiet() {
        println!("{}", receipt.id);
    } else {
        println!("Stored text record {}", receipt.id);
    }
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_record_id(&args.id)?;
    let claims = ctx.claims()?;
    let view = ctx.vault()?.texts().read(&claims, &id)?;

    if args.json {
        return print_json(&view);
    }
    println!("{}", view.text);
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let id = parse_record_id(id)?;
    let claims = ctx.claims()?;
    ctx.vault()?.texts().delete(&claims, &id)?;
    if !ctx.quiet() {
        println!("Deleted text record {}", id);
    }
    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::invalid_input("Pass TEXT or pipe it on stdin").into());
    }
    let mut body = String::new();
    stdin
        .read_to_string(&mut body)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(body)
}

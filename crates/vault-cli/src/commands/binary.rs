use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use vault_core::{parse_record_id, BinaryPayload};

use crate::app::AppContext;
use crate::cli::BinaryCommand;
use crate::errors::CliError;
use crate::output::{format_size, print_fields, print_json};

pub fn handle_binary(ctx: &AppContext, command: &BinaryCommand) -> anyhow::Result<()> {
    match command {
        BinaryCommand::Add { file, name, json } => handle_add(ctx, file, name.as_deref(), *json),
        BinaryCommand::Get { id, out, json } => handle_get(ctx, id, out, *json),
        BinaryCommand::Delete { id } => handle_delete(ctx, id),
    }
}

fn handle_add(ctx: &AppContext, file: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filename = match name {
        Some(value) => value.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| CliError::invalid_input(format!("No filename in {}", file.display())))?,
    };
    let data = std::fs::read(file).map_err(|e| {
        CliError::invalid_input(format!("Failed to read {}: {}", file.display(), e))
    })?;
    let size = data.len();

    let claims = ctx.claims()?;
    let receipt = ctx
        .vault()?
        .binaries()
        .create(&claims, BinaryPayload::new(filename, data))?;

    if json {
        return print_json(&receipt);
    }
    if ctx.quiet() {
        println!("{}", receipt.id);
    } else {
        println!(
            "Stored {} ({}) as {}",
            receipt.filename,
            format_size(size),
            receipt.id
        );
    }
    Ok(())
}

fn handle_get(ctx: &AppContext, id: &str, out: &Path, json: bool) -> anyhow::Result<()> {
    let id = parse_record_id(id)?;
    let claims = ctx.claims()?;
    let view = ctx.vault()?.binaries().read(&claims, &id)?;

    let target = out.join(&view.filename);
    // create_new refuses to replace an existing file.
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => anyhow::Error::from(CliError::invalid_input(
                format!("Refusing to overwrite {}", target.display()),
            )),
            _ => anyhow::anyhow!("Failed to create {}: {}", target.display(), e),
        })?;
    file.write_all(&view.data)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", target.display(), e))?;

    if json {
        return print_json(&serde_json::json!({
            "id": view.id,
            "filename": view.filename,
            "path": target,
            "size": view.data.len(),
        }));
    }
    if !ctx.quiet() {
        print_fields(&[
            ("ID", view.id.to_string()),
            ("Filename", view.filename.clone()),
            ("Size", format_size(view.data.len())),
            ("Written to", target.display().to_string()),
        ]);
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let id = parse_record_id(id)?;
    let claims = ctx.claims()?;
    ctx.vault()?.binaries().delete(&claims, &id)?;
    if !ctx.quiet() {
        println!("Deleted binary record {}", id);
    }
    Ok(())
}

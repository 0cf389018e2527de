use vault_core::records::validation::mask_card_number;
use vault_core::{parse_record_id, CardPayload};

use crate::app::{read_card_secrets, AppContext};
use crate::cli::{CardCommand, ShowArgs};
use crate::output::{print_fields, print_json};

pub fn handle_card(ctx: &AppContext, command: &CardCommand) -> anyhow::Result<()> {
    match command {
        CardCommand::Add {
            holder,
            expires,
            json,
        } => {
            let secrets = read_card_secrets()?;
            let payload = CardPayload {
                card_number: secrets.number,
                cardholder_name: holder.clone(),
                expiration_date: expires.clone(),
                cvv: secrets.cvv,
            };
            handle_add(ctx, payload, *json)
        }
        CardCommand::Show(args) => handle_show(ctx, args),
        CardCommand::Delete { id } => handle_delete(ctx, id),
    }
}

fn handle_add(ctx: &AppContext, payload: CardPayload, json: bool) -> anyhow::Result<()> {
    let claims = ctx.claims()?;
    let receipt = ctx.vault()?.cards().create(&claims, payload)?;

    if json {
        return print_json(&receipt);
    }
    if ctx.quiet() {
        println!("{}", receipt.id);
    } else {
        println!(
            "Stored card for {} (expires {}) as {} at {}",
            receipt.cardholder_name,
            receipt.expiration_date,
            receipt.id,
            receipt.created_at.to_rfc3339()
        );
    }
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_record_id(&args.id)?;
    let claims = ctx.claims()?;
    let view = ctx.vault()?.cards().read(&claims, &id)?;

    if args.json {
        return print_json(&view);
    }
    print_fields(&[
        ("ID", view.id.to_string()),
        ("Number", view.card_number.clone()),
        ("Masked", mask_card_number(&view.card_number)),
        ("Cardholder", view.cardholder_name.clone()),
        ("Expires", view.expiration_date.clone()),
        ("CVV", view.cvv.clone()),
        ("Created", view.created_at.to_rfc3339()),
    ]);
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let id = parse_record_id(id)?;
    let claims = ctx.claims()?;
    ctx.vault()?.cards().delete(&claims, &id)?;
    if !ctx.quiet() {
        println!("Deleted card record {}", id);
    }
    Ok(())
}

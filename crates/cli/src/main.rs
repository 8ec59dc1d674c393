//! Bazaar storefront cart client

use std::{
    io::{self, Write},
    process::ExitCode,
};

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, error};

use bazaar_app::{
    context::{AppContext, AppInitError},
    page::{CartPage, Notification, NotificationLevel},
    store::CartStoreError,
};

use crate::config::{Cli, CodeCommand, Command};

mod config;
mod logging;
mod render;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error(transparent)]
    Store(#[from] CartStoreError),

    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Bazaar CLI entry point
#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version requests land here too.
            _ = error.print();

            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(error) = logging::init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(failure) => {
            error!(error = %failure, "command failed");

            #[expect(
                clippy::print_stderr,
                reason = "final error report after logging may be filtered out"
            )]
            {
                eprintln!("{failure}");
            }

            ExitCode::FAILURE
        }
    }
}

/// Run one command. Returns whether it succeeded.
async fn run(cli: Cli) -> Result<bool, CliError> {
    let context = AppContext::from_config(&cli.api.to_api_config())?;
    let mut out = io::stdout().lock();

    debug!(command = ?cli.command, "running command");

    match cli.command {
        Command::Offer => {
            let offer = context.cart.active_offer().await?;

            render::write_offer(&mut out, offer.as_ref(), Timestamp::now())?;

            Ok(true)
        }
        Command::Wishlist { product } => {
            let outcome = context.wishlist.toggle(product).await;
            let success = outcome.success;

            if let Some(notification) = Notification::from_outcome(outcome) {
                render::write_notification(&mut out, &notification)?;
            }

            Ok(success)
        }
        command => {
            let page = context.cart_page();

            if let Some(failure) = page.load().await {
                render::write_notification(&mut out, &failure)?;

                return Ok(false);
            }

            run_cart_command(&page, command, &mut out).await
        }
    }
}

async fn run_cart_command(
    page: &CartPage,
    command: Command,
    out: &mut impl Write,
) -> Result<bool, CliError> {
    let notification = match command {
        Command::Show | Command::Offer | Command::Wishlist { .. } => None,
        Command::Add { product, quantity } => page.add(product, quantity).await,
        Command::Update { product, quantity } => page.set_quantity(product, quantity).await,
        Command::Remove { product } => page.remove(product).await,
        Command::Clear => page.clear().await,
        Command::Coupon(CodeCommand::Apply { code }) => page.apply_coupon(&code).await,
        Command::Coupon(CodeCommand::Remove) => page.remove_coupon().await,
        Command::Referral(CodeCommand::Apply { code }) => page.apply_referral(&code).await,
        Command::Referral(CodeCommand::Remove) => page.remove_referral().await,
        Command::Checkout => {
            return match page.checkout() {
                Ok(summary) => {
                    render::write_checkout(out, &summary)?;

                    Ok(true)
                }
                Err(failure) => {
                    let notification = Notification {
                        level: NotificationLevel::Error,
                        message: failure.to_string(),
                    };

                    render::write_notification(out, &notification)?;

                    Ok(false)
                }
            };
        }
    };

    let success = match &notification {
        Some(notification) => {
            render::write_notification(out, notification)?;

            notification.level != NotificationLevel::Error
        }
        None => true,
    };

    render::write_cart(out, &page.view())?;

    Ok(success)
}

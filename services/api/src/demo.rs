use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;
use rust_decimal::Decimal;

use crate::infra::{
    InMemoryLoiRepository, InMemoryNotificationPublisher, InMemoryOfferRepository,
};
use shortdeal::error::AppError;
use shortdeal::marketplace::loi::{FixedLayoutRenderer, LoiRenderer, LoiService};
use shortdeal::marketplace::offers::{
    ContentId, ContentListing, ContentStatus, Currency, OfferError, OfferRequest, OfferService,
    PartyProfile,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Days after creation at which the producer responds; values past the
    /// 7-day validity demonstrate the expiry rejection
    #[arg(long, default_value_t = 3)]
    pub(crate) accept_after_days: u32,
}

fn sample_request() -> OfferRequest {
    OfferRequest {
        content: ContentListing {
            content_id: ContentId("content-demo-1".to_string()),
            producer: PartyProfile {
                handle: "studio-one".to_string(),
                company_name: Some("Studio One".to_string()),
                country: Some("Korea".to_string()),
            },
            title: "City Lights".to_string(),
            description: "Short-form documentary series, 12 episodes.".to_string(),
            status: ContentStatus::Public,
        },
        buyer: PartyProfile {
            handle: "acme-buyer".to_string(),
            company_name: Some("Acme Media".to_string()),
            country: Some("Germany".to_string()),
        },
        offered_price: Decimal::new(10000, 2),
        currency: Currency::Usd,
        message: Some("Interested in a one-year license.".to_string()),
        validity_days: 7,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let notifications = InMemoryNotificationPublisher::default();
    let renderer: Arc<dyn LoiRenderer> = Arc::new(FixedLayoutRenderer);
    let lois = Arc::new(LoiService::new(
        Arc::new(InMemoryLoiRepository::default()),
        renderer,
    ));
    let offers = Arc::new(OfferService::new(
        Arc::new(InMemoryOfferRepository::default()),
        lois,
        Arc::new(notifications.clone()),
    ));

    let created_at = Utc::now();
    let record = offers.create(sample_request(), created_at)?;
    println!("== Offer created ==");
    println!(
        "{}",
        serde_json::to_string_pretty(&record.view(created_at)).unwrap_or_default()
    );

    match offers.create(sample_request(), created_at) {
        Err(OfferError::DuplicatePending) => {
            println!("\nSecond offer on the same content refused: duplicate pending offer.")
        }
        other => println!("\nUnexpected duplicate outcome: {other:?}"),
    }

    let respond_at = created_at + Duration::days(i64::from(args.accept_after_days));
    println!(
        "\n== Producer responds after {} day(s) ==",
        args.accept_after_days
    );
    match offers.accept(&record.id, Some("Looking forward to it.".to_string()), respond_at) {
        Ok((accepted, loi)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&accepted.view(respond_at)).unwrap_or_default()
            );
            if let Some(loi) = loi {
                println!("\n== Letter of intent ==");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&loi.view()).unwrap_or_default()
                );
                if let Some(artifact) = loi.artifact {
                    println!("\n== Rendered document ==");
                    println!("{}", String::from_utf8_lossy(&artifact.bytes));
                }
            }
        }
        Err(err) => println!("Acceptance refused: {err}"),
    }

    let events = notifications.events();
    if !events.is_empty() {
        println!("== Notifications ==");
        for event in events {
            println!("- {} -> {}", event.template, event.recipients.join(", "));
        }
    }

    Ok(())
}

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use shared::{
    CheckInRequest, CouponRequest, CreateDayRequest, Highlight, LogLevel, Meal, RegistrationInput, SubscriberCard,
};
use std::path::PathBuf;
use std::process::ExitCode;

use mess_entry::backend::{ActionReport, Backend};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory holding the configuration, subscriber cache and day files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Work on this day (YYYY-MM-DD) instead of the current one
    #[arg(long, global = true, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Keep everything local for this run
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the day's entry file
    CreateDay {
        /// Do not refresh or apply leaves
        #[arg(long)]
        no_leaves: bool,
        /// Use the cached subscriber list as is
        #[arg(long)]
        no_subscribers: bool,
        /// Do not publish the online sheet
        #[arg(long)]
        no_mirror: bool,
    },
    /// Check a subscriber in for a meal
    CheckIn {
        /// Full registration number, or the digits after the batch prefix with --batch
        number: String,
        /// Batch prefix the number belongs to, e.g. MS25
        #[arg(long)]
        batch: Option<String>,
        /// Meal to check in for; derived from the time of day when absent
        #[arg(long)]
        meal: Option<Meal>,
        #[arg(long)]
        non_veg: bool,
        /// Non-veg surcharge, overriding the configured one
        #[arg(long)]
        surcharge: Option<String>,
    },
    /// Sell a walk-in coupon
    Coupon {
        identifier: String,
        price: String,
        #[arg(long)]
        meal: Option<Meal>,
    },
    /// Summarise the day
    Summary,
    /// Rebuild the subscriber cache from the form spreadsheets
    SyncSubscribers,
    /// Refresh the current-leave sheet
    RefreshLeaves,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", value, e))
}

fn print_status<T>(report: &ActionReport<T>) {
    let tag = match report.status.level {
        LogLevel::Info => "OK",
        LogLevel::Warning => "WARN",
        LogLevel::Error => "ERROR",
    };
    println!("[{}] {} {}", tag, report.status.time, report.status.message);
    if let Some(card) = &report.card {
        print_card(card);
    }
}

fn print_card(card: &SubscriberCard) {
    let highlight = match &card.highlight {
        Highlight::AlreadyEaten => "ALREADY EATEN".to_string(),
        Highlight::Leave => "LEAVE".to_string(),
        Highlight::NotSubscribed => "NOT SUBSCRIBED".to_string(),
        Highlight::Meals(meals) => meals.clone(),
    };
    println!("  Name:         {}", card.name);
    println!("  Registration: {}", card.registration_number);
    println!("  Meals:        {} ({})", card.meals_subscribed, card.meal_list);
    println!("  Status:       {}", highlight);
}

fn exit_code<T>(report: &ActionReport<T>) -> ExitCode {
    if report.value.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut backend: Backend = Backend::open(args.data_dir)?;
    if let Some(date) = args.date {
        backend.set_day_date(date);
    }
    if args.offline {
        backend.set_online(false);
    }
    info!(
        "Active day: {} (display scaling {})",
        backend.day_id(),
        backend.config().scaling
    );

    let code = match args.command {
        Command::CreateDay {
            no_leaves,
            no_subscribers,
            no_mirror,
        } => {
            let request = CreateDayRequest {
                update_leaves: !no_leaves,
                update_subscribers: !no_subscribers,
                create_mirror: !no_mirror,
            };
            let report = backend.run_action(|b| b.create_day(&request));
            if let Some(response) = &report.value {
                println!("{}", response.report);
            }
            print_status(&report);
            exit_code(&report)
        }
        Command::CheckIn {
            number,
            batch,
            meal,
            non_veg,
            surcharge,
        } => {
            let registration = match batch {
                Some(prefix) => RegistrationInput::Batch { prefix, digits: number },
                None => RegistrationInput::Other(number),
            };
            let request = CheckInRequest {
                registration,
                meal,
                non_veg,
                surcharge,
            };
            let report = backend.run_action(|b| b.check_in(&request));
            print_status(&report);
            if let Some(response) = &report.value {
                print_card(&response.card);
                if let Some(coupon) = &response.coupon {
                    println!("  Surcharge:    {} ({} coupons sold)", coupon.amount, coupon.coupons_sold);
                }
            }
            exit_code(&report)
        }
        Command::Coupon {
            identifier,
            price,
            meal,
        } => {
            let request = CouponRequest {
                identifier,
                price,
                meal,
            };
            let report = backend.run_action(|b| b.generate_coupon(&request));
            print_status(&report);
            if let Some(response) = &report.value {
                println!("  {} coupons sold for {}", response.coupons_sold, response.meal);
            }
            exit_code(&report)
        }
        Command::Summary => {
            let report = backend.run_action(|b| b.calculate());
            if let Some(response) = &report.value {
                println!("{}", response.report);
            }
            print_status(&report);
            exit_code(&report)
        }
        Command::SyncSubscribers => {
            let report = backend.run_action(|b| b.sync_subscribers());
            print_status(&report);
            exit_code(&report)
        }
        Command::RefreshLeaves => {
            let report = backend.run_action(|b| b.refresh_leaves());
            print_status(&report);
            exit_code(&report)
        }
    };

    Ok(code)
}

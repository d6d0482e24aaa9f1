use bookflow::data::{ProviderRole, ReplayScript, ScriptEvent};
use bookflow::draft::{
    ContactInfo, FamilyMember, MemberTime, PatientDetails, PatientInfo, ProviderAssignment,
    VerificationMethod,
};
use bookflow::error::FlowConversionError;
use bookflow::prelude::*;
use bookflow::services::{AvailabilityQuery, AvailableSlot};
use chrono::{Days, Local, NaiveTime, TimeDelta};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These structs match the `flows.json` format and are only used here for conversion.

#[derive(Deserialize)]
struct RawFlowFile {
    flows: RawFlows,
    /// Extra screen type names, e.g. `{ "from": "Clinic", "to": "Location" }`.
    #[serde(default)]
    aliases: Vec<RawAlias>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawFlows(Vec<RawFlow>);

#[derive(Deserialize)]
struct RawFlow {
    id: String,
    #[serde(alias = "patientType")]
    patient_type: String,
    #[serde(alias = "appointmentPath")]
    appointment_path: String,
    screens: Vec<RawScreen>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScreen {
    Name(String),
    Detailed {
        id: Option<String>,
        #[serde(alias = "type")]
        screen_type: String,
        label: Option<String>,
    },
}

#[derive(Deserialize)]
struct RawAlias {
    from: String,
    to: String,
}

// --- Converter Implementation ---

impl IntoFlow for RawFlows {
    fn into_flow(self) -> std::result::Result<FlowDefinition, FlowConversionError> {
        let flows = self
            .0
            .into_iter()
            .map(|raw| {
                if raw.screens.is_empty() {
                    return Err(FlowConversionError::ValidationError(format!(
                        "flow '{}' lists no screens",
                        raw.id
                    )));
                }
                let screens = raw
                    .screens
                    .into_iter()
                    .map(|screen| match screen {
                        RawScreen::Name(name) => ScreenDefinition::of_type(&name),
                        RawScreen::Detailed {
                            id,
                            screen_type,
                            label,
                        } => ScreenDefinition {
                            id: id.unwrap_or_else(|| screen_type.clone()),
                            screen_type,
                            label,
                        },
                    })
                    .collect();
                Ok(FlowSequenceDefinition {
                    id: raw.id,
                    patient_type: raw.patient_type,
                    appointment_path: raw.appointment_path,
                    screens,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(FlowDefinition { flows })
    }
}

/// Compile, inspect and walk through appointment booking flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a flow definition JSON file (defaults to the built-in flows)
    #[arg(long, global = true)]
    flows: Option<String>,

    /// Path to a compiled catalog artifact, used instead of --flows
    #[arg(long, global = true, conflicts_with = "flows")]
    catalog: Option<String>,

    /// Path to a clinic directory JSON file (defaults to the sample clinic)
    #[arg(long, global = true)]
    clinic: Option<String>,

    /// Path to a bookflow configuration JSON file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Run in interactive mode and book an appointment screen by screen
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every flow's screens and step count
    Table,
    /// Compile flows and write the binary catalog artifact
    Compile {
        /// Where to write the artifact
        #[arg(short, long, default_value = "catalog.bin")]
        out: String,
    },
    /// Replay a scripted session against the mock services
    Replay {
        /// Path to the replay script JSON file
        script: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookflow=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    if cli.human {
        let catalog = load_catalog(cli.flows.as_deref(), cli.catalog.as_deref());
        let clinic = load_clinic(cli.clinic.as_deref());
        run_interactive(catalog, clinic, config).await;
        return;
    }

    match cli.command {
        Some(Command::Table) | None => {
            let catalog = load_catalog(cli.flows.as_deref(), cli.catalog.as_deref());
            print_table(&catalog);
        }
        Some(Command::Compile { out }) => {
            let catalog = compile_flows(cli.flows.as_deref());
            let flows = catalog.len();
            CompiledCatalog::new(catalog)
                .save(&out)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", out, e)));
            println!("Compiled {} flows into '{}'", flows, out);
        }
        Some(Command::Replay { script }) => {
            let catalog = load_catalog(cli.flows.as_deref(), cli.catalog.as_deref());
            let clinic = load_clinic(cli.clinic.as_deref());
            let script = ReplayScript::from_file(&script).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load replay script '{}': {}", script, e))
            });
            run_replay(script, catalog, clinic, config).await;
        }
    }
}

fn load_config(path: Option<&str>) -> BookflowConfig {
    let base = match path {
        Some(path) => BookflowConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => BookflowConfig::default(),
    };
    base.with_env_overrides(|key| std::env::var(key).ok())
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid environment: {}", e)))
}

fn load_clinic(path: Option<&str>) -> Arc<ClinicDirectory> {
    let clinic = match path {
        Some(path) => ClinicDirectory::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load clinic from '{}': {}", path, e))
        }),
        None => ClinicDirectory::default(),
    };
    Arc::new(clinic)
}

fn compile_flows(flows_path: Option<&str>) -> FlowCatalog {
    let start = Instant::now();
    let Some(path) = flows_path else {
        return FlowCatalog::standard()
            .unwrap_or_else(|e| exit_with_error(&format!("Built-in flows failed to compile: {}", e)));
    };

    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read flows file '{}': {}", path, e)));
    let raw: RawFlowFile = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flows JSON: {}", e)));

    let aliases = raw.aliases;
    let definition = raw
        .flows
        .into_flow()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert flows: {}", e)));

    let builder = aliases
        .iter()
        .fold(Compiler::builder(definition), |builder, alias| {
            builder.with_type_mapping(&alias.from, &alias.to)
        });
    let catalog = builder
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Flow compilation failed: {}", e)));
    tracing::info!(flows = catalog.len(), elapsed = ?start.elapsed(), "flows compiled");
    catalog
}

fn load_catalog(flows_path: Option<&str>, artifact_path: Option<&str>) -> FlowCatalog {
    match artifact_path {
        Some(path) => CompiledCatalog::from_file(path)
            .map(CompiledCatalog::into_catalog)
            .unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to load catalog '{}': {}", path, e))
            }),
        None => compile_flows(flows_path),
    }
}

fn print_table(catalog: &FlowCatalog) {
    println!("{:<20} {:<10} {:<8} {:>5}", "Flow", "Patient", "Path", "Steps");
    println!("{}", "-".repeat(46));
    for flow in catalog.flows() {
        println!(
            "{:<20} {:<10} {:<8} {:>5}",
            flow.id,
            flow.key.patient,
            flow.key.path,
            flow.total_steps()
        );
        println!("    {}", SummaryFormatter::flow_outline(flow));
    }
}

fn print_view(view: &ScreenView, progress: u8) {
    println!("\n[{:>3}%] {}", progress, SummaryFormatter::progress_label(view));
}

fn show_current(session: &BookingSession) {
    match (session.screen(), session.progress_percent()) {
        (Ok(view), Ok(progress)) => print_view(&view, progress),
        (Err(e), _) | (_, Err(e)) => println!("  ! {}", e),
    }
}

async fn close_session(session: &mut BookingSession) {
    match session.finish_close().await {
        Ok(()) => println!("\nWidget closed."),
        Err(e) => println!("  ! {}", e),
    }
}

/// Replays a script through a session backed by the mock services.
async fn run_replay(
    script: ReplayScript,
    catalog: FlowCatalog,
    clinic: Arc<ClinicDirectory>,
    config: BookflowConfig,
) {
    println!("Replaying '{}' ({} events)", script.name, script.events.len());
    let services = Services::mock(clinic.clone(), &config.services);
    let mut session = BookingSession::new(Sequencer::new(catalog), config.session.clone());

    if let Err(e) = session.open() {
        exit_with_error(&format!("Failed to open the widget: {}", e));
    }
    show_current(&session);

    for event in script.events {
        let outcome = match event {
            ScriptEvent::Advance { update } => session.continue_with(update).map(|_| ()),
            ScriptEvent::Auto => {
                let collected = match session.screen() {
                    Ok(view) => services
                        .collect_update(&view, &clinic, &config.services.verification_code)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                match collected {
                    Ok(update) => session.continue_with(update).map(|_| ()),
                    Err(message) => {
                        println!("  ! {}", message);
                        continue;
                    }
                }
            }
            ScriptEvent::Back => session.back().map(|_| ()),
            ScriptEvent::Close => match session.request_close() {
                Ok(CloseOutcome::ConfirmationShown) => {
                    println!("  Leave the booking? Your progress will be lost.");
                    continue;
                }
                Ok(CloseOutcome::Closing) => {
                    close_session(&mut session).await;
                    break;
                }
                Err(e) => Err(e),
            },
            ScriptEvent::ConfirmLeave => match session.confirm_leave() {
                Ok(_) => {
                    close_session(&mut session).await;
                    break;
                }
                Err(e) => Err(e),
            },
            ScriptEvent::CancelLeave => session.cancel_leave(),
        };

        match outcome {
            Ok(()) => show_current(&session),
            Err(e) => println!("  ! {}", e),
        }
    }

    if session.state() == WidgetState::Open {
        let summary = BookingSummary::from_draft(session.draft());
        if summary.key.is_some() {
            println!("\n--- Booking Summary ---");
            println!("{}", SummaryFormatter::booking_summary(&summary, &clinic));
        }
    }
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
async fn run_interactive(catalog: FlowCatalog, clinic: Arc<ClinicDirectory>, config: BookflowConfig) {
    println!("--- bookflow Interactive Mode ---");
    println!("At each screen: [c]ontinue, [b]ack or [q]uit.");

    let services = Services::mock(clinic.clone(), &config.services);
    let mut session = BookingSession::new(Sequencer::new(catalog), config.session.clone());
    if let Err(e) = session.open() {
        exit_with_error(&format!("Failed to open the widget: {}", e));
    }

    loop {
        let view = match session.screen() {
            Ok(view) => view,
            Err(e) => exit_with_error(&e.to_string()),
        };
        print_view(&view, session.progress_percent().unwrap_or(0));

        if view.screen.is_terminal() {
            let summary = BookingSummary::from_draft(session.draft());
            println!("{}", SummaryFormatter::booking_summary(&summary, &clinic));
            if let Ok(CloseOutcome::Closing) = session.request_close() {
                close_session(&mut session).await;
            }
            return;
        }

        match prompt_for_input("Action", Some("c")).as_str() {
            "b" | "back" => {
                if let Err(e) = session.back() {
                    println!("  ! {}", e);
                }
            }
            "q" | "quit" => match session.request_close() {
                Ok(CloseOutcome::Closing) => {
                    close_session(&mut session).await;
                    return;
                }
                Ok(CloseOutcome::ConfirmationShown) => {
                    let answer = prompt_for_input(
                        "Leave the booking? Your progress will be lost (y/n)",
                        Some("n"),
                    );
                    if answer.eq_ignore_ascii_case("y") {
                        if session.confirm_leave().is_ok() {
                            close_session(&mut session).await;
                        }
                        return;
                    }
                    if let Err(e) = session.cancel_leave() {
                        println!("  ! {}", e);
                    }
                }
                Err(e) => println!("  ! {}", e),
            },
            _ => match collect_interactive(&view, &session, &services, &clinic, &config).await {
                Ok(update) => {
                    if let Err(e) = session.continue_with(update) {
                        println!("  ! {}", e);
                    }
                }
                Err(message) => println!("  ! {}", message),
            },
        }
    }
}

/// Prompts for whatever the current screen collects.
async fn collect_interactive(
    view: &ScreenView,
    session: &BookingSession,
    services: &Services,
    clinic: &ClinicDirectory,
    config: &BookflowConfig,
) -> std::result::Result<DraftUpdate, String> {
    let draft = session.draft();
    let location_id = draft.location_id().unwrap_or_default().to_string();

    let update = match view.screen {
        ScreenId::Welcome => {
            let patient_type: PatientType = prompt_for_input("New or returning patient", Some("new"))
                .parse()
                .map_err(|e: bookflow::error::UnknownVariant| e.to_string())?;
            let path: AppointmentPath =
                prompt_for_input("Appointment type (single/combo/family)", Some("single"))
                    .parse()
                    .map_err(|e: bookflow::error::UnknownVariant| e.to_string())?;
            DraftUpdate::selection(FlowKey::new(patient_type, path))
        }
        ScreenId::Location => {
            let location = choose("Locations", &clinic.locations, |l| {
                format!("{} ({})", l.name, l.address)
            })?;
            DraftUpdate::Location {
                location_id: location.id.clone(),
            }
        }
        ScreenId::Category => {
            let category = choose("Categories", &clinic.categories, |c| c.name.clone())?;
            DraftUpdate::Category {
                category_id: category.id.clone(),
            }
        }
        ScreenId::Procedure => {
            let category_id = draft
                .single()
                .and_then(|d| d.category_id.clone())
                .unwrap_or_default();
            let procedures: Vec<_> = clinic.procedures_in(&category_id).cloned().collect();
            let procedure = choose("Procedures", &procedures, |p| {
                format!("{} ({} min)", p.name, p.duration_minutes)
            })?;
            DraftUpdate::Procedure {
                procedure_id: procedure.id.clone(),
            }
        }
        ScreenId::Provider => DraftUpdate::Provider {
            provider_id: choose_provider(clinic, &location_id, None)?,
        },
        ScreenId::ExamProvider => DraftUpdate::ExamProvider {
            provider_id: choose_provider(clinic, &location_id, Some(ProviderRole::Dentist))?,
        },
        ScreenId::HygieneProvider => DraftUpdate::HygieneProvider {
            provider_id: choose_provider(clinic, &location_id, Some(ProviderRole::Hygienist))?,
        },
        ScreenId::Slot => {
            let provider_id = draft.single().and_then(|d| d.provider_id.clone());
            let slot = choose_slot(services, &location_id, provider_id).await?;
            DraftUpdate::Slot {
                date: slot.date,
                time: slot.time,
            }
        }
        ScreenId::ComboSlot => {
            let provider_id = draft.combo().and_then(|d| d.exam_provider_id.clone());
            let slot = choose_slot(services, &location_id, provider_id).await?;
            let exam_minutes = clinic
                .procedure(bookflow::summary::COMBO_EXAM_PROCEDURE)
                .map_or(45, |p| p.duration_minutes);
            DraftUpdate::ComboSlot {
                date: slot.date,
                exam_time: slot.time,
                hygiene_time: add_minutes(slot.time, exam_minutes),
            }
        }
        ScreenId::PatientInfo => DraftUpdate::PatientInfo(PatientInfo {
            first_name: prompt_required("First name")?,
            last_name: prompt_required("Last name")?,
            date_of_birth: None,
            phone: prompt_required("Mobile number")?,
            email: optional(prompt_for_input("Email (optional)", None)),
        }),
        ScreenId::VerificationMethod => {
            let method = match prompt_for_input("Verify by sms or email", Some("sms")).as_str() {
                "email" => VerificationMethod::Email,
                _ => VerificationMethod::Sms,
            };
            let contact = prompt_for_input("Send the code to", draft.primary_contact());
            DraftUpdate::VerificationMethod { method, contact }
        }
        ScreenId::PhoneVerify => {
            println!("  (the demo verification code is {})", config.services.verification_code);
            let code = prompt_for_input("Verification code", None);
            services
                .collect_update(view, clinic, &code)
                .await
                .map_err(|e| e.to_string())?
        }
        ScreenId::PatientLookup | ScreenId::Payment => {
            if let ScreenProps::Payment { summary } = &view.props {
                println!("  Deposit due: {}", clinic.deposit_for(summary));
            }
            services
                .collect_update(view, clinic, &config.services.verification_code)
                .await
                .map_err(|e| e.to_string())?
        }
        ScreenId::PatientDetailsEntry => DraftUpdate::PatientDetails(PatientDetails {
            first_name: prompt_required("First name")?,
            last_name: prompt_required("Last name")?,
            date_of_birth: None,
            contact: prompt_required("Phone or email on file")?,
        }),
        ScreenId::FamilySetup => {
            let count: usize = prompt_for_input("How many family members", Some("2"))
                .parse()
                .map_err(|_| "Please enter a number".to_string())?;
            let members = (1..=count)
                .map(|n| {
                    prompt_required(&format!("Name of member {}", n)).map(|name| FamilyMember {
                        member_id: format!("member-{}", n),
                        name,
                        date_of_birth: None,
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            DraftUpdate::FamilyMembers { members }
        }
        ScreenId::ReturningFamilySetup => {
            let ScreenProps::ReturningFamilySetup { available, .. } = &view.props else {
                return Err("No family members on record".to_string());
            };
            for (i, member) in available.iter().enumerate() {
                println!("  {}: {}", i + 1, member.name);
            }
            let picked = prompt_for_input("Members to book (e.g. 1,2)", Some("1"));
            let member_ids = picked
                .split(',')
                .map(|n| {
                    n.trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| available.get(i))
                        .map(|m| m.member_id.clone())
                        .ok_or_else(|| format!("'{}' is not a listed member", n.trim()))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            DraftUpdate::FamilySelection { member_ids }
        }
        ScreenId::FamilyProvider | ScreenId::ReturningFamilyProvider => {
            let members = draft.family().map(|d| d.members.clone()).unwrap_or_default();
            let mut assignments = Vec::new();
            for member in members {
                println!("  Provider for {}:", member.name);
                assignments.push(ProviderAssignment {
                    member_id: member.member_id,
                    provider_id: choose_provider(clinic, &location_id, None)?,
                });
            }
            DraftUpdate::FamilyProviders { assignments }
        }
        ScreenId::FamilySlot => {
            let family = draft.family().ok_or("No family booking in progress")?;
            let first_provider = family.assignments.first().map(|a| a.provider_id.clone());
            let slot = choose_slot(services, &location_id, first_provider).await?;
            let times = family
                .members
                .iter()
                .enumerate()
                .map(|(i, member)| MemberTime {
                    member_id: member.member_id.clone(),
                    time: add_minutes(slot.time, clinic.hours.slot_minutes * i as u32),
                })
                .collect();
            DraftUpdate::FamilySlot {
                date: slot.date,
                times,
            }
        }
        ScreenId::FamilyContactInfo => DraftUpdate::FamilyContact(ContactInfo {
            name: prompt_required("Contact name")?,
            phone: prompt_required("Contact phone")?,
            email: optional(prompt_for_input("Contact email (optional)", None)),
        }),
        ScreenId::Confirmation | ScreenId::FamilyConfirmation => {
            return Err("The booking is complete".to_string());
        }
    };
    Ok(update)
}

fn choose_provider(
    clinic: &ClinicDirectory,
    location_id: &str,
    role: Option<ProviderRole>,
) -> std::result::Result<String, String> {
    let providers: Vec<_> = clinic.providers_at(location_id, role).cloned().collect();
    choose("Providers", &providers, |p| p.name.clone()).map(|p| p.id.clone())
}

async fn choose_slot(
    services: &Services,
    location_id: &str,
    provider_id: Option<String>,
) -> std::result::Result<AvailableSlot, String> {
    let from = Local::now().date_naive();
    let query = AvailabilityQuery {
        location_id: location_id.to_string(),
        provider_id,
        from,
        to: from.checked_add_days(Days::new(6)).unwrap_or(from),
    };
    let slots = services
        .available_slots(&query)
        .await
        .map_err(|e| e.to_string())?;
    let offered: Vec<_> = slots.into_iter().step_by(4).take(10).collect();
    choose("Available times", &offered, |s| {
        format!("{} at {}", s.date.format("%a %b %-d"), s.time.format("%-I:%M %p"))
    })
    .cloned()
}

fn add_minutes(time: NaiveTime, minutes: u32) -> NaiveTime {
    time.overflowing_add_signed(TimeDelta::minutes(i64::from(minutes)))
        .0
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Lists `items` and asks for a 1-based choice.
fn choose<'a, T>(
    title: &str,
    items: &'a [T],
    describe: impl Fn(&T) -> String,
) -> std::result::Result<&'a T, String> {
    if items.is_empty() {
        return Err(format!("No {} available", title.to_lowercase()));
    }
    println!("  {}:", title);
    for (i, item) in items.iter().enumerate() {
        println!("    {}: {}", i + 1, describe(item));
    }
    let choice = prompt_for_input("Choice", Some("1"));
    choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| items.get(i))
        .ok_or_else(|| format!("'{}' is not one of the options", choice))
}

fn prompt_required(prompt_text: &str) -> std::result::Result<String, String> {
    let value = prompt_for_input(prompt_text, None);
    if value.is_empty() {
        Err(format!("{} is required", prompt_text))
    } else {
        Ok(value)
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    if let Err(e) = io::stdout().flush() {
        exit_with_error(&format!("Failed to write prompt: {}", e));
    }
    if let Err(e) = io::stdin().read_line(&mut line) {
        exit_with_error(&format!("Failed to read line: {}", e));
    }
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

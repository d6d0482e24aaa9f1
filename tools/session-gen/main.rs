use bookflow::data::{ClinicDirectory, ProviderRole, ReplayScript, ScriptEvent};
use bookflow::draft::{
    BookingDraft, ContactInfo, DraftUpdate, FamilyMember, MemberTime, PatientDetails,
    PatientInfo, PatientRecord, ProviderAssignment, VerificationMethod,
};
use bookflow::flow::{AppointmentPath, FlowKey, PatientType, ScreenId};
use bookflow::sequencer::{FlowPosition, Sequencer};
use bookflow::summary::BookingSummary;
use chrono::{Days, NaiveDate, NaiveTime, TimeDelta};
use clap::Parser;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fs;

const FIRST_NAMES: &[&str] = &["Maya", "Liam", "Ava", "Noah", "Zoe", "Omar", "Ines", "Tomas"];
const LAST_NAMES: &[&str] = &["Rivera", "Chen", "Okoro", "Smith", "Novak", "Haddad"];

/// A CLI tool to generate random booking sessions for `bookflow-cli replay`
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON script to
    #[arg(short, long, default_value = "generated_session.json")]
    output: String,

    /// Patient type to book for (random if omitted)
    #[arg(long)]
    patient: Option<PatientType>,

    /// Appointment path to book (random if omitted)
    #[arg(long)]
    path: Option<AppointmentPath>,

    /// Chance of pressing "back" before each step
    #[arg(long, default_value_t = 0.1)]
    back_probability: f64,

    /// Abandon the booking part-way through instead of finishing it
    #[arg(long)]
    abandon: bool,

    /// Let the replay call the mock services for lookup, verification and payment
    #[arg(long)]
    auto: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if !(0.0..1.0).contains(&cli.back_probability) {
        eprintln!(
            "Error: --back-probability ({}) must be in [0, 1)",
            cli.back_probability
        );
        std::process::exit(1);
    }

    let key = FlowKey::new(
        cli.patient
            .unwrap_or_else(|| *PatientType::ALL.choose(&mut rng).unwrap_or(&PatientType::New)),
        cli.path.unwrap_or_else(|| {
            *AppointmentPath::ALL
                .choose(&mut rng)
                .unwrap_or(&AppointmentPath::Single)
        }),
    );
    println!("Generating a {} session...", key);

    let sequencer = Sequencer::standard()?;
    let clinic = ClinicDirectory::default();
    let events = generate_events(&mut rng, &cli, key, &sequencer, &clinic)?;

    let script = ReplayScript {
        name: format!("random {}", key),
        events,
    };
    let json_output = serde_json::to_string_pretty(&script)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} events and saved them to '{}'",
        script.events.len(),
        cli.output
    );
    Ok(())
}

/// Walks the flow for `key`, emitting an event per interaction.
fn generate_events(
    rng: &mut ThreadRng,
    cli: &Cli,
    key: FlowKey,
    sequencer: &Sequencer,
    clinic: &ClinicDirectory,
) -> Result<Vec<ScriptEvent>, Box<dyn std::error::Error>> {
    let total = sequencer
        .catalog()
        .get(key)
        .map(|flow| flow.total_steps())
        .ok_or("the standard catalog is missing a flow")?;
    let abandon_at = cli.abandon.then(|| rng.random_range(2..total));

    let (mut position, mut draft) = Sequencer::start();
    let mut events = Vec::new();

    loop {
        if Some(position.step()) == abandon_at {
            events.push(ScriptEvent::Close);
            if rng.random_bool(0.3) {
                events.push(ScriptEvent::CancelLeave);
                events.push(ScriptEvent::Close);
            }
            events.push(ScriptEvent::ConfirmLeave);
            return Ok(events);
        }

        let view = sequencer.current_screen(position, &draft)?;
        if view.screen.is_terminal() {
            events.push(ScriptEvent::Close);
            return Ok(events);
        }

        if position.step() > 1 && rng.random_bool(cli.back_probability) {
            events.push(ScriptEvent::Back);
            position = Sequencer::retreat(position);
            continue;
        }

        let update = random_update(rng, view.screen, key, &draft, clinic);
        let collaborator = matches!(
            view.screen,
            ScreenId::PatientLookup | ScreenId::PhoneVerify | ScreenId::Payment
        );
        events.push(if cli.auto && collaborator {
            ScriptEvent::Auto
        } else {
            ScriptEvent::Advance {
                update: update.clone(),
            }
        });
        position = advance(sequencer, position, &mut draft, update)?;
    }
}

fn advance(
    sequencer: &Sequencer,
    position: FlowPosition,
    draft: &mut BookingDraft,
    update: DraftUpdate,
) -> Result<FlowPosition, Box<dyn std::error::Error>> {
    Ok(sequencer.advance(position, draft, update)?)
}

fn pick<'a, T>(rng: &mut ThreadRng, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

fn random_name(rng: &mut ThreadRng) -> (String, String) {
    (
        pick(rng, FIRST_NAMES).unwrap_or(&"Alex").to_string(),
        pick(rng, LAST_NAMES).unwrap_or(&"Doe").to_string(),
    )
}

fn random_phone(rng: &mut ThreadRng) -> String {
    format!("555{:07}", rng.random_range(0..10_000_000))
}

fn random_date(rng: &mut ThreadRng) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap_or_default();
    base.checked_add_days(Days::new(rng.random_range(0..14)))
        .unwrap_or(base)
}

fn random_time(rng: &mut ThreadRng, clinic: &ClinicDirectory) -> NaiveTime {
    let hours = &clinic.hours;
    let open_minutes = (hours.close - hours.open).num_minutes().max(0) as u32;
    let slots = (open_minutes / hours.slot_minutes.max(1)).max(1);
    let slot = rng.random_range(0..slots);
    add_minutes(hours.open, slot * hours.slot_minutes)
}

fn add_minutes(time: NaiveTime, minutes: u32) -> NaiveTime {
    time.overflowing_add_signed(TimeDelta::minutes(i64::from(minutes)))
        .0
}

fn random_provider(
    rng: &mut ThreadRng,
    clinic: &ClinicDirectory,
    location_id: &str,
    role: Option<ProviderRole>,
) -> String {
    let providers: Vec<_> = clinic.providers_at(location_id, role).collect();
    pick(rng, &providers).map_or_else(String::new, |p| p.id.clone())
}

/// A plausible update for `screen`, consistent with what `draft` already holds.
fn random_update(
    rng: &mut ThreadRng,
    screen: ScreenId,
    key: FlowKey,
    draft: &BookingDraft,
    clinic: &ClinicDirectory,
) -> DraftUpdate {
    let location_id = draft.location_id().unwrap_or_default().to_string();

    match screen {
        ScreenId::Welcome => DraftUpdate::selection(key),
        ScreenId::Location => DraftUpdate::Location {
            location_id: pick(rng, &clinic.locations)
                .map_or_else(String::new, |l| l.id.clone()),
        },
        ScreenId::Category => DraftUpdate::Category {
            category_id: pick(rng, &clinic.categories)
                .map_or_else(String::new, |c| c.id.clone()),
        },
        ScreenId::Procedure => {
            let category_id = draft
                .single()
                .and_then(|d| d.category_id.clone())
                .unwrap_or_default();
            let procedures: Vec<_> = clinic.procedures_in(&category_id).collect();
            DraftUpdate::Procedure {
                procedure_id: pick(rng, &procedures).map_or_else(String::new, |p| p.id.clone()),
            }
        }
        ScreenId::Provider => DraftUpdate::Provider {
            provider_id: random_provider(rng, clinic, &location_id, None),
        },
        ScreenId::ExamProvider => DraftUpdate::ExamProvider {
            provider_id: random_provider(rng, clinic, &location_id, Some(ProviderRole::Dentist)),
        },
        ScreenId::HygieneProvider => DraftUpdate::HygieneProvider {
            provider_id: random_provider(rng, clinic, &location_id, Some(ProviderRole::Hygienist)),
        },
        ScreenId::Slot => DraftUpdate::Slot {
            date: random_date(rng),
            time: random_time(rng, clinic),
        },
        ScreenId::ComboSlot => {
            let exam_time = random_time(rng, clinic);
            DraftUpdate::ComboSlot {
                date: random_date(rng),
                exam_time,
                hygiene_time: add_minutes(exam_time, 45),
            }
        }
        ScreenId::PatientInfo => {
            let (first_name, last_name) = random_name(rng);
            DraftUpdate::PatientInfo(PatientInfo {
                email: Some(format!(
                    "{}.{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                )),
                first_name,
                last_name,
                date_of_birth: None,
                phone: random_phone(rng),
            })
        }
        ScreenId::VerificationMethod => DraftUpdate::VerificationMethod {
            method: VerificationMethod::Sms,
            contact: draft
                .primary_contact()
                .map_or_else(|| random_phone(rng), str::to_string),
        },
        ScreenId::PhoneVerify => DraftUpdate::Verified {
            method: draft
                .common()
                .and_then(|c| c.verification.as_ref())
                .map_or(VerificationMethod::Sms, |v| v.method),
            contact: draft
                .primary_contact()
                .map_or_else(|| random_phone(rng), str::to_string),
        },
        ScreenId::Payment => {
            let amount = clinic.deposit_for(&BookingSummary::from_draft(draft));
            DraftUpdate::payment(format!("PAY-{:06}", rng.random_range(0..1_000_000)), amount)
        }
        ScreenId::PatientDetailsEntry => {
            let (first_name, last_name) = random_name(rng);
            DraftUpdate::PatientDetails(PatientDetails {
                first_name,
                last_name,
                date_of_birth: None,
                contact: random_phone(rng),
            })
        }
        ScreenId::PatientLookup => {
            let details = draft.common().and_then(|c| c.details()).cloned();
            let (first_name, last_name, phone) = match details {
                Some(d) => (d.first_name, d.last_name, d.contact),
                None => {
                    let (first, last) = random_name(rng);
                    (first, last, random_phone(rng))
                }
            };
            let member = |id: &str, first: &str| FamilyMember {
                member_id: id.to_string(),
                name: format!("{} {}", first, last_name),
                date_of_birth: None,
            };
            DraftUpdate::PatientFound(PatientRecord {
                patient_id: format!("pt-{}", last_name.to_lowercase()),
                family_members: vec![member("fm-1", "Sam"), member("fm-2", "Alex")],
                first_name,
                last_name,
                phone,
                email: None,
            })
        }
        ScreenId::FamilySetup => {
            let count = rng.random_range(2..=4);
            let (_, last_name) = random_name(rng);
            let members = (1..=count)
                .map(|n| FamilyMember {
                    member_id: format!("member-{}", n),
                    name: format!(
                        "{} {}",
                        pick(rng, FIRST_NAMES).unwrap_or(&"Kid"),
                        last_name
                    ),
                    date_of_birth: None,
                })
                .collect();
            DraftUpdate::FamilyMembers { members }
        }
        ScreenId::ReturningFamilySetup => {
            let available = draft
                .common()
                .and_then(|c| c.record())
                .map(|r| r.family_members.clone())
                .unwrap_or_default();
            let count = rng.random_range(1..=available.len().max(1));
            DraftUpdate::FamilySelection {
                member_ids: available
                    .iter()
                    .take(count)
                    .map(|m| m.member_id.clone())
                    .collect(),
            }
        }
        ScreenId::FamilyProvider | ScreenId::ReturningFamilyProvider => {
            let members = draft.family().map(|d| d.members.clone()).unwrap_or_default();
            DraftUpdate::FamilyProviders {
                assignments: members
                    .into_iter()
                    .map(|m| ProviderAssignment {
                        member_id: m.member_id,
                        provider_id: random_provider(rng, clinic, &location_id, None),
                    })
                    .collect(),
            }
        }
        ScreenId::FamilySlot => {
            let start = random_time(rng, clinic);
            let times = draft
                .family()
                .map(|d| d.members.as_slice())
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(i, m)| MemberTime {
                    member_id: m.member_id.clone(),
                    time: add_minutes(start, clinic.hours.slot_minutes * i as u32),
                })
                .collect();
            DraftUpdate::FamilySlot {
                date: random_date(rng),
                times,
            }
        }
        ScreenId::FamilyContactInfo => {
            let (first, last) = random_name(rng);
            DraftUpdate::FamilyContact(ContactInfo {
                name: format!("{} {}", first, last),
                phone: random_phone(rng),
                email: None,
            })
        }
        // Terminal screens collect nothing; the walk stops before reaching here.
        ScreenId::Confirmation | ScreenId::FamilyConfirmation => DraftUpdate::selection(key),
    }
}

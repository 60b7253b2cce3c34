use clap::{Parser, Subcommand};
use medibook_core::{
    classify, BookingService, CatalogService, CoreConfig, IdentityService, RecordId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "medibook")]
#[command(about = "MediBook appointment booking system CLI")]
struct Cli {
    /// Clinic data directory (defaults to CLINIC_DATA_DIR or /clinic_data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all doctors in the catalog
    ListDoctors,
    /// List a user's appointments with their derived status
    ListAppointments {
        /// Owner record id (32 lowercase hex characters)
        owner_id: String,
    },
    /// Create an admin account unless one with this email exists
    SeedAdmin {
        /// Admin display name
        name: String,
        /// Admin email address
        email: String,
        /// Admin password
        password: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        std::env::var("CLINIC_DATA_DIR")
            .unwrap_or_else(|_| "/clinic_data".into())
            .into()
    });
    let cfg = Arc::new(CoreConfig::new(data_dir));

    match cli.command {
        Some(Commands::ListDoctors) => {
            let catalog = CatalogService::new(cfg);
            let doctors = catalog.list();
            if doctors.is_empty() {
                println!("No doctors found.");
            } else {
                for doctor in doctors {
                    println!(
                        "ID: {}, Name: {}, Specialization: {}, Clinic: {}, Fee: {}, Available: {}",
                        doctor.id,
                        doctor.name,
                        doctor.specialization,
                        doctor.clinic,
                        doctor.consultation_fee,
                        doctor.available
                    );
                }
            }
        }
        Some(Commands::ListAppointments { owner_id }) => {
            let owner = RecordId::parse(&owner_id)?;
            let booking = BookingService::new(cfg);
            let today = chrono::Utc::now().date_naive();

            let appointments = booking.list_for_owner(&owner);
            if appointments.is_empty() {
                println!("No appointments found.");
            } else {
                for appointment in appointments {
                    let derived = classify(&appointment, today);
                    println!(
                        "ID: {}, Doctor: {}, Date: {} {}, Status: {:?}",
                        appointment.id,
                        appointment.doctor_name,
                        appointment.date,
                        appointment.time,
                        derived
                    );
                }
            }
        }
        Some(Commands::SeedAdmin {
            name,
            email,
            password,
        }) => {
            let identity = IdentityService::new(cfg);
            match identity.ensure_admin(&name, &email, &password) {
                Ok(true) => println!("Seeded admin user: {}", email),
                Ok(false) => println!("Admin user already exists: {}", email),
                Err(e) => eprintln!("Error seeding admin: {}", e),
            }
        }
        None => {
            println!("Use 'medibook --help' for commands");
        }
    }

    Ok(())
}

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use estate_market::config::{AdminSeed, AppConfig};
use estate_market::error::AppError;
use estate_market::infra::{InMemoryObjectStorage, InMemoryStore, RecordingMailer};
use estate_market::workflows::appointments::{CreateAppointmentRequest, SellerNotesRequest};
use estate_market::workflows::auth::{LoginRequest, RegisterRequest};
use estate_market::workflows::estates::{
    CategoryRequest, CreateEstateRequest, EstateSearchQuery, EstateType, PresignRequest,
};
use estate_market::workflows::identity::Principal;
use estate_market::workflows::sellers::{SellerApplication, VerifySellerRequest};
use estate_market::workflows::{Clock, ManualClock, PageRequest, WorkflowError};
use estate_market::{Marketplace, MarketplaceAdapters};
use rust_decimal::Decimal;
use std::sync::Arc;

const DEMO_PASSWORD: &str = "demo-password";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Starting instant for the simulated clock (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Skip the viewing appointment portion of the demo.
    #[arg(long)]
    pub(crate) skip_appointments: bool,
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 ({err})"))
}

struct Demo {
    market: Marketplace,
    mailer: RecordingMailer,
    clock: Arc<ManualClock>,
}

impl Demo {
    fn new(start: DateTime<Utc>) -> Self {
        let config = AppConfig::for_tests();
        let mailer = RecordingMailer::new();
        let clock = Arc::new(ManualClock::new(start));
        let market = Marketplace::new(
            &config,
            MarketplaceAdapters {
                store: InMemoryStore::new(),
                mailer: Arc::new(mailer.clone()),
                storage: Arc::new(InMemoryObjectStorage::from_config(&config.storage)),
                clock: clock.clone(),
            },
        );
        Self {
            market,
            mailer,
            clock,
        }
    }

    fn sign_up(&self, name: &str, last_name: &str, email: &str) -> Result<Principal, AppError> {
        self.market.auth.register(RegisterRequest {
            name: name.to_string(),
            middle_name: None,
            last_name: last_name.to_string(),
            second_last_name: None,
            email: email.to_string(),
            password: DEMO_PASSWORD.to_string(),
            contact_number: None,
            profile_picture: None,
        })?;
        let token = self.mailer.last_verification_token(email).ok_or_else(|| {
            WorkflowError::NotFound(format!("no verification email was sent to {email}"))
        })?;
        println!("  {email}: verification token {token} received");
        self.market.auth.verify_email(&token)?;
        self.sign_in(email, DEMO_PASSWORD)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AppError> {
        let session = self.market.auth.login(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let principal = self
            .market
            .authenticator
            .authenticate(Some(&format!("Bearer {}", session.access_token)))?;
        Ok(principal)
    }
}

fn roles(principal: &Principal) -> String {
    principal
        .roles
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(Utc::now);
    let demo = Demo::new(start);

    println!("Estate Market demo");
    println!("Simulated clock starts at {}", start.to_rfc3339());

    println!("\nAccounts");
    demo.market.seed_admin(&AdminSeed {
        email: "admin@estate.demo".to_string(),
        password: DEMO_PASSWORD.to_string(),
    })?;
    let admin = demo.sign_in("admin@estate.demo", DEMO_PASSWORD)?;
    println!("  admin@estate.demo seeded with roles [{}]", roles(&admin));
    let buyer = demo.sign_up("Beatriz", "Alves", "buyer@estate.demo")?;
    let member = demo.sign_up("Sofia", "Carvalho", "seller@estate.demo")?;

    println!("\nSeller onboarding");
    let application = demo.market.sellers.apply(
        &member,
        SellerApplication {
            city: "Lisbon".to_string(),
            address: "Rua Garrett 50".to_string(),
            company_name: Some("Carvalho Imobiliaria".to_string()),
            license_number: Some("AMI-2047".to_string()),
            bio: Some("Family agency in Chiado".to_string()),
        },
    )?;
    println!(
        "  application #{} submitted ({})",
        application.id.0,
        application.status.label()
    );
    let reviewed = demo.market.sellers.verify(
        &admin,
        application.id,
        VerifySellerRequest {
            approved: true,
            notes: Some("License checked".to_string()),
        },
    )?;
    println!(
        "  application #{} reviewed: {}",
        reviewed.id.0,
        reviewed.status.label()
    );
    let seller = demo.sign_in("seller@estate.demo", DEMO_PASSWORD)?;
    println!("  seller roles after approval: [{}]", roles(&seller));

    println!("\nListings");
    let category = demo.market.categories.create(
        &admin,
        CategoryRequest {
            name: "Apartment".to_string(),
            description: Some("Flats and penthouses".to_string()),
        },
    )?;
    let uploads = demo.market.images.presigned_urls(
        &seller,
        PresignRequest {
            file_name: "living-room.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            count: 2,
        },
    )?;
    for upload in &uploads {
        println!("  upload slot {}", upload.file_name);
    }

    let listings = [
        ("Chiado penthouse", EstateType::Sale, 685_000),
        ("Alfama studio", EstateType::Rent, 1_150),
    ];
    let mut created = Vec::with_capacity(listings.len());
    for (name, estate_type, price) in listings {
        let estate = demo.market.estates.create(
            &seller,
            CreateEstateRequest {
                name: name.to_string(),
                description: format!("{name} close to the tram line"),
                price: Decimal::new(price, 0),
                estate_type,
                city: "Lisbon".to_string(),
                address: "Rua da Misericordia 20".to_string(),
                category_id: category.id.0,
                images: uploads.iter().map(|upload| upload.file_url.clone()).collect(),
                characteristics: Vec::new(),
            },
        )?;
        println!(
            "  #{} {} submitted ({})",
            estate.id.0,
            estate.name,
            estate.status.label()
        );
        created.push(estate);
        demo.clock.advance(Duration::minutes(5));
    }

    let queue = demo
        .market
        .estates
        .list_pending(&admin, PageRequest::new(0, 10))?;
    println!("  moderation queue holds {} listing(s)", queue.total_elements);
    for estate in &created {
        let approved = demo.market.estates.approve(&admin, estate.id)?;
        println!("  #{} {}", approved.id.0, approved.status.label());
    }

    println!("\nSearch");
    let results = demo.market.estates.search(&EstateSearchQuery {
        city: Some("lisbon".to_string()),
        sort_by: "price".to_string(),
        sort_dir: "ASC".to_string(),
        ..EstateSearchQuery::default()
    })?;
    for estate in &results.content {
        println!(
            "  {} | {} | {} EUR",
            estate.name,
            estate.estate_type.label(),
            estate.price
        );
    }

    println!("\nFavorites");
    let penthouse = &created[0];
    demo.market.favorites.add(&buyer, penthouse.id)?;
    let count = demo.market.favorites.count(&buyer)?;
    println!(
        "  buyer saved '{}' ({} favorite(s))",
        penthouse.name, count.count
    );

    if !args.skip_appointments {
        println!("\nViewing appointment");
        let viewing = demo.market.appointments.create(
            &buyer,
            CreateAppointmentRequest {
                estate_id: penthouse.id.0,
                appointment_date: demo.clock.now() + Duration::days(2),
                message: Some("Could we see the terrace at sunset?".to_string()),
            },
        )?;
        println!(
            "  #{} requested for {} ({})",
            viewing.id.0,
            viewing.appointment_date.to_rfc3339(),
            viewing.status.label()
        );

        match demo.market.appointments.create(
            &admin,
            CreateAppointmentRequest {
                estate_id: penthouse.id.0,
                appointment_date: viewing.appointment_date,
                message: None,
            },
        ) {
            Ok(_) => println!("  unexpected: double booking accepted"),
            Err(err) => println!("  second booking for the same slot refused: {err}"),
        }

        let pending = demo.market.appointments.pending_count(&seller)?;
        println!("  seller has {} pending request(s)", pending.pending);
        let confirmed = demo.market.appointments.confirm(
            &seller,
            viewing.id,
            SellerNotesRequest {
                notes: Some("Ring the top bell".to_string()),
            },
        )?;
        println!("  #{} {}", confirmed.id.0, confirmed.status.label());

        demo.clock.advance(Duration::days(2) + Duration::hours(1));
        let completed = demo.market.appointments.complete(&seller, viewing.id)?;
        println!("  #{} {}", completed.id.0, completed.status.label());
    }

    println!("\nClosing");
    let sold = demo.market.estates.mark_sold(&seller, penthouse.id)?;
    println!("  '{}' is now {}", sold.name, sold.status.label());
    let feed = demo
        .market
        .estates
        .search_by_type(EstateType::Sale, &EstateSearchQuery::default())?;
    println!("  public sale feed now lists {} estate(s)", feed.total_elements);
    println!("  emails sent: {}", demo.mailer.sent().len());

    Ok(())
}

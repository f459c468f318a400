use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;

use crate::db::{get_connection, get_setting_f64, init_db, set_setting};
use crate::error::Result;
use crate::jobs;
use crate::messages;
use crate::roster;
use crate::settings::load_settings;
use crate::sheet::RawJob;

const COMPANY: &[(&str, &str)] = &[
    ("company.name", "Summit Garage Door Co"),
    ("company.phone", "(818) 555-0144"),
    ("company.address", "9218 Glenoaks Blvd, Sun Valley, CA 91352"),
    ("company.email", "office@summitgaragedoor.co"),
    ("company.website", "summitgaragedoor.co"),
];

// (name, email, phone, commission_rate). Dan and Ben split the company.
const TECHNICIANS: &[(&str, &str, &str, f64)] = &[
    ("Dan Weaver", "dan@summitgaragedoor.co", "(818) 555-0101", 0.50),
    ("Ben Souza", "ben@summitgaragedoor.co", "(818) 555-0102", 0.50),
    ("Avi Rosen", "avi@summitgaragedoor.co", "(818) 555-0117", 0.35),
    ("Eli Navarro", "eli@summitgaragedoor.co", "(818) 555-0123", 0.30),
    ("Marcus Hale", "marcus@summitgaragedoor.co", "(818) 555-0131", 0.25),
];

// (name, email, role)
const USERS: &[(&str, &str, &str)] = &[
    ("Dan Weaver", "dan@summitgaragedoor.co", "owner"),
    ("Ben Souza", "ben@summitgaragedoor.co", "owner"),
    ("Rosa Delgado", "rosa@summitgaragedoor.co", "dispatcher"),
    ("Avi Rosen", "avi@summitgaragedoor.co", "technician"),
    ("Eli Navarro", "eli@summitgaragedoor.co", "technician"),
];

// (name, category, part_number, purchase_price, markup_pct, stock, min_stock)
const SUPPLIES: &[(&str, &str, &str, f64, f64, i64, i64)] = &[
    ("Torsion spring 2\" x 32\"", "Springs", "TS-232", 28.50, 40.0, 24, 10),
    ("Torsion spring 2\" x 36\"", "Springs", "TS-236", 32.00, 40.0, 6, 8),
    ("Extension spring 120 lb", "Springs", "ES-120", 14.75, 35.0, 18, 6),
    ("Chain drive opener 1/2 HP", "Openers", "OP-CD12", 168.00, 30.0, 5, 3),
    ("Belt drive opener 3/4 HP", "Openers", "OP-BD34", 229.00, 30.0, 2, 3),
    ("Hinge #2 galvanized", "Hardware", "HG-02", 2.10, 50.0, 140, 50),
    ("3\" nylon roller (10 pack)", "Hardware", "RL-3N10", 19.90, 45.0, 11, 6),
    ("Bottom seal 16'", "Weather Stripping", "WS-B16", 12.40, 40.0, 9, 12),
    ("Photo eye sensor pair", "Safety", "SF-PE01", 24.00, 35.0, 8, 4),
    ("Keypad entry unit", "Security", "SC-KP01", 31.50, 30.0, 4, 2),
];

// (notes, base sales, base parts cost)
const SERVICES: &[(&str, f64, f64)] = &[
    ("Broken spring replacement", 425.0, 95.0),
    ("Opener install", 780.0, 310.0),
    ("Panel replacement", 1450.0, 620.0),
    ("New double door install", 2600.0, 1150.0),
    ("Track realignment", 260.0, 40.0),
    ("Annual maintenance", 180.0, 25.0),
    ("Cable replacement", 340.0, 70.0),
    ("Commercial rolling door service", 3900.0, 1600.0),
];

// (client, phone, address)
const CLIENTS: &[(&str, &str, &str)] = &[
    ("Maria Lopez", "(818) 555-0201", "1412 W Olive Ave, Burbank"),
    ("James Park", "(818) 555-0202", "334 N Screenland Dr, Burbank"),
    ("Elaine Brooks", "(323) 555-0203", "5214 Hermitage Ave, Valley Village"),
    ("Tom Andrade", "(818) 555-0204", "10645 Collins St, North Hollywood"),
    ("Priya Natarajan", "(818) 555-0205", "4417 Ben Ave, Studio City"),
    ("Frank DiMarco", "(818) 555-0206", "7733 Clybourn Ave, Sun Valley"),
    ("Sandra Whitfield", "(323) 555-0207", "2810 Waverly Dr, Los Angeles"),
    ("Hector Fuentes", "(818) 555-0208", "9022 Tujunga Ave, Sun Valley"),
    ("Annette Kim", "(818) 555-0209", "618 E Palm Ave, Burbank"),
    ("Glendale Storage Partners", "(818) 555-0210", "400 W Colorado St, Glendale"),
    ("Omar Haddad", "(818) 555-0211", "5550 Vineland Ave, North Hollywood"),
    ("Ruth Castellano", "(818) 555-0212", "1219 N Maclay Ave, San Fernando"),
    ("Dave Okafor", "(818) 555-0213", "14201 Friar St, Van Nuys"),
    ("Lena Petrosyan", "(818) 555-0214", "1029 Justin Ave, Glendale"),
    ("Bill Tran", "(818) 555-0215", "6912 Fulton Ave, Valley Glen"),
    ("Carmen Silva", "(818) 555-0216", "8230 Lankershim Blvd, North Hollywood"),
    ("Pacific Auto Body", "(818) 555-0217", "11500 Sherman Way, North Hollywood"),
    ("Nick Galanis", "(818) 555-0218", "515 Salem St, Glendale"),
    ("Dora Espinoza", "(818) 555-0219", "13317 Vanowen St, Van Nuys"),
    ("Sam Whitaker", "(323) 555-0220", "3901 Tracy St, Los Angeles"),
];

const LEAD_CODES: &[&str] = &["TT", "GG", "WS", "RF", "PC", "YP", "FB", "GG", "CB", ""];

const TECH_ROTATION: &[&str] = &[
    "Dan Weaver",
    "Avi Rosen",
    "Ben Souza",
    "Eli Navarro",
    "Dan Weaver, Ben Souza",
];

/// Clamp a day to the last valid day of the given year/month.
fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let last_day = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap())
        .pred_opt()
        .unwrap()
        .day();
    day.min(last_day)
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let d = clamp_day(year, month, day);
    format!("{year:04}-{month:02}-{d:02}")
}

fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

/// Build ~18 months of job rows ending at the current month. Deterministic:
/// the same call on the same day produces the same sheet.
fn generate_jobs() -> Vec<RawJob> {
    let today = Local::now().date_naive();
    let mut rows = Vec::new();
    let mut k = 0usize;

    for i in 0..18u32 {
        // Count backwards: i=0 is 17 months ago, i=17 is current month
        let months_ago = 17 - i;
        let target = today - chrono::Months::new(months_ago);
        let year = target.year();
        let month = target.month();
        let jobs_this_month = 4 + (i as usize % 3);

        for _ in 0..jobs_this_month {
            let (client, phone, address) = CLIENTS[(k * 7) % CLIENTS.len()];
            let (notes, base_sales, base_parts) = SERVICES[(k * 3) % SERVICES.len()];
            let vary = 1.0 + ((k % 9) as f64 - 4.0) * 0.02;
            let sales = round2(base_sales * vary);
            let parts = round2(base_parts * vary);

            let status = if months_ago == 0 {
                ["New Lead", "In Progress", "Awaiting Parts", "Pending Payment"][k % 4]
            } else if months_ago == 1 && k % 3 == 0 {
                "Pending Payment"
            } else if k % 11 == 3 {
                "Cancelled"
            } else {
                "Closed"
            };

            let mut job = RawJob::new();
            job.set("Count", (1001 + k).to_string());
            job.set("Date", make_date(year, month, 2 + (k as u32 * 5) % 26));
            job.set("Client Name", client);
            job.set("Phone", phone);
            job.set("Address", address);
            job.set("Technician", TECH_ROTATION[k % TECH_ROTATION.len()]);
            job.set("Status", status);
            job.set("LP", LEAD_CODES[k % LEAD_CODES.len()]);
            job.set("Sales", format!("{sales:.2}"));
            job.set("Company Parts", format!("{parts:.2}"));
            job.set("Total Costs", format!("{parts:.2}"));
            job.set("Notes", notes);

            // Closed jobs carry payments in rotating shapes; one shape leaves
            // payments blank so reconciliation falls back to Sales.
            if status == "Closed" {
                match k % 4 {
                    0 => job.set("Cash", format!("{sales:.2}")),
                    1 => {
                        let fee = round2(sales * 0.029);
                        job.set("CC after fee", format!("{:.2}", round2(sales - fee)));
                        job.set("CC fee", format!("{fee:.2}"));
                    }
                    2 => job.set("Check/Zelle", crate::fmt::money(sales)),
                    _ => {}
                }
            }

            rows.push(job);
            k += 1;
        }
    }

    rows
}

pub struct DemoCounts {
    pub jobs: usize,
    pub technicians: usize,
    pub users: usize,
    pub supplies: usize,
}

fn insert_demo_data(conn: &Connection) -> Result<DemoCounts> {
    for (key, value) in COMPANY {
        set_setting(conn, key, value)?;
    }

    for (name, email, phone, rate) in TECHNICIANS {
        roster::add_technician(conn, name, Some(email), Some(phone), *rate)?;
    }
    roster::set_status(conn, "Marcus Hale", "inactive")?;

    for (name, email, role) in USERS {
        conn.execute(
            "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, email, role],
        )?;
    }

    for (name, category, part_number, purchase, markup, stock, min_stock) in SUPPLIES {
        crate::supplies::add_supply(
            conn,
            name,
            category,
            Some(part_number),
            *purchase,
            *markup,
            None,
            *stock,
            *min_stock,
            Some("Valley Door Supply"),
        )?;
    }

    let rates = roster::commission_rates(conn)?;
    let default_rate = get_setting_f64(conn, "commission.default_rate", 0.30)?;
    let rows = generate_jobs();
    let job_count = rows.len();
    for mut job in rows {
        jobs::apply_derived_fields(&mut job, &rates, default_rate);
        jobs::insert_row(conn, &job)?;
    }

    messages::send(conn, "Rosa Delgado", "dispatcher", "Avi Rosen",
        "Parts for the Fuentes job arrived, pick them up before your first stop.", false)?;
    messages::send(conn, "Rosa Delgado", "dispatcher", "Eli Navarro",
        "Customer on Vanowen moved their window to 2-4pm.", true)?;
    messages::reply(conn, "Avi Rosen", "Rosa Delgado", "Got it, swinging by the shop at 8.")?;

    Ok(DemoCounts {
        jobs: job_count,
        technicians: TECHNICIANS.len(),
        users: USERS.len(),
        supplies: SUPPLIES.len(),
    })
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = PathBuf::from(&settings.data_dir).join("overhead.db");

    if !db_path.exists() {
        eprintln!("No database found. Run `overhead init` first.");
        std::process::exit(1);
    }

    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    // Idempotency guard
    let existing: i64 = conn.query_row("SELECT count(*) FROM all_jobs", [], |r| r.get(0))?;
    if existing > 0 {
        println!("Demo data already loaded ({existing} jobs on the sheet).");
        return Ok(());
    }

    let counts = insert_demo_data(&conn)?;

    println!("Demo data loaded!");
    println!("  Company:      Summit Garage Door Co");
    println!("  Jobs:         {}", counts.jobs);
    println!("  Technicians:  {}", counts.technicians);
    println!("  Users:        {}", counts.users);
    println!("  Supplies:     {}", counts.supplies);
    println!();
    println!("Try these next:");
    println!("  overhead jobs list");
    println!("  overhead board");
    println!("  overhead dashboard --period year");
    println!("  overhead customers list");
    println!("  overhead techs stats");

    Ok(())
}

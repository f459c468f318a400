pub mod backup;
pub mod board;
pub mod completions;
pub mod customers;
pub mod dashboard;
pub mod demo;
pub mod export;
pub mod forms;
pub mod import;
pub mod init;
pub mod jobs;
pub mod messages;
pub mod roles;
pub mod schedule;
pub mod settings;
pub mod stages;
pub mod status;
pub mod supplies;
pub mod techs;
pub mod users;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "overhead", about = "Job tracking and dispatch CLI for garage door service companies.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Overhead: choose a data directory and initialize the database.
    Init {
        /// Path for Overhead data (default: ~/Documents/overhead)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage jobs on the sheet.
    Jobs {
        #[command(subcommand)]
        command: JobsCommands,
    },
    /// Customer roll-up grouped from the job sheet.
    Customers {
        #[command(subcommand)]
        command: CustomersCommands,
    },
    /// Manage the technician roster.
    Techs {
        #[command(subcommand)]
        command: TechsCommands,
    },
    /// Kanban board of active pipeline stages.
    Board {
        /// Open the interactive full-screen browser
        #[arg(long, short)]
        interactive: bool,
    },
    /// Upcoming jobs grouped by day.
    Schedule {
        /// How many days ahead to show
        #[arg(long, default_value = "14")]
        days: i64,
    },
    /// Company dashboard: metrics, monthly trend, lead platforms, leaderboard.
    Dashboard {
        /// Period: all, year, month, week
        #[arg(long, default_value = "all")]
        period: String,
    },
    /// Manage pipeline stages.
    Stages {
        #[command(subcommand)]
        command: StagesCommands,
    },
    /// Manage intake form fields.
    Forms {
        #[command(subcommand)]
        command: FormsCommands,
    },
    /// Dispatch-to-technician messaging.
    Messages {
        #[command(subcommand)]
        command: MessagesCommands,
    },
    /// Parts and supplies inventory.
    Supplies {
        #[command(subcommand)]
        command: SuppliesCommands,
    },
    /// Manage roles and the permission catalog.
    Roles {
        #[command(subcommand)]
        command: RolesCommands,
    },
    /// Manage users.
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Show or change settings and the company profile.
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Import a job sheet (CSV or XLSX).
    Import {
        /// Path to the sheet to import
        file: String,
        /// Importer format key (sheet, legacy, excel)
        #[arg(long)]
        format: Option<String>,
        /// Import even if this exact file was imported before
        #[arg(long)]
        force: bool,
    },
    /// Export data to CSV.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Load a sample company (technicians, stages, jobs) to explore Overhead.
    Demo,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/overhead-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show current database and summary statistics.
    Status,
    /// Generate shell completion scripts.
    Completions {
        /// Shell: bash, zsh, fish, elvish, powershell
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum JobsCommands {
    /// List active jobs plus jobs closed in the last few days.
    List {
        /// Filter by stage name
        #[arg(long)]
        stage: Option<String>,
        /// Case-insensitive search over client, technician, and status
        #[arg(long)]
        search: Option<String>,
        /// Include every non-deleted job regardless of age
        #[arg(long)]
        all: bool,
    },
    /// Show one job's full card by its sheet count.
    Show {
        /// Sheet count (the running job number)
        count: String,
    },
    /// Add a job to the sheet.
    Add {
        /// Client name
        #[arg(long)]
        client: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Job date (YYYY-MM-DD or M/D/YY; default today)
        #[arg(long)]
        date: Option<String>,
        /// Comma-separated technician names
        #[arg(long)]
        technician: Option<String>,
        /// Lead platform code (TT, GG, WS, ...)
        #[arg(long)]
        lp: Option<String>,
        /// Sales amount
        #[arg(long)]
        sales: Option<String>,
        /// Pipeline stage (default New Lead)
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Set one sheet column on a job.
    Edit {
        count: String,
        /// Column name, e.g. 'Sales' or 'Client Name'
        column: String,
        /// New value (empty clears the column)
        value: String,
    },
    /// Move a job to a pipeline stage.
    Status { count: String, stage: String },
    /// Reassign a job's technicians (comma-separated).
    Assign { count: String, technicians: String },
    /// Move a job to the trash.
    Delete { count: String },
    /// Restore a trashed job to New Lead.
    Restore { count: String },
    /// Permanently remove a trashed job.
    Purge { count: String },
    /// List trashed jobs.
    Trash,
}

#[derive(Subcommand)]
pub enum CustomersCommands {
    /// List customers with running totals, newest activity first.
    List,
    /// Show one customer: totals, tags, and jobs per location.
    Show {
        /// Customer name as it appears on the sheet
        name: String,
    },
}

#[derive(Subcommand)]
pub enum TechsCommands {
    /// List the roster with per-technician performance.
    List {
        /// Include deactivated technicians
        #[arg(long)]
        all: bool,
    },
    /// Add a technician to the roster.
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Commission rate as a fraction, e.g. 0.35
        #[arg(long)]
        rate: Option<f64>,
    },
    /// Change a technician's commission rate.
    Rate {
        name: String,
        /// New rate as a fraction in [0, 1]
        rate: f64,
    },
    /// Update a technician's contact details.
    Contact {
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Full performance table: jobs, revenue, profit, commission.
    Stats,
    /// Deactivate a technician (kept for history).
    Deactivate { name: String },
    /// Reactivate a technician.
    Activate { name: String },
    /// Remove a technician from the roster.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum StagesCommands {
    /// List stages in board order.
    List,
    /// Add a stage at the end of the board.
    Add {
        name: String,
        /// Hex color like '#3B82F6'
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a stage.
    Rename { name: String, new_name: String },
    /// Change a stage's color.
    Color {
        name: String,
        /// Hex color like '#3B82F6'
        color: String,
    },
    /// Move a stage to a position (1-based), shifting the others.
    Reorder { name: String, position: i64 },
    /// Remove a stage (refused while jobs still carry it).
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum FormsCommands {
    /// List intake form fields in order.
    List,
    /// Add a form field.
    Add {
        name: String,
        /// Display label (defaults to the name)
        #[arg(long)]
        label: Option<String>,
        /// Field type: text, number, date, select, textarea, checkbox
        #[arg(long = "type", default_value = "text")]
        field_type: String,
        #[arg(long)]
        required: bool,
        /// Options for select fields, comma-separated
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,
    },
    /// Change a field's display label.
    Label { name: String, label: String },
    /// Mark a field required.
    Require { name: String },
    /// Mark a field optional.
    Unrequire { name: String },
    /// Replace a select field's options.
    Options {
        name: String,
        /// New options, comma-separated
        #[arg(value_delimiter = ',')]
        options: Vec<String>,
    },
    /// Move a field to a position (1-based), shifting the others.
    Reorder { name: String, position: i64 },
    /// Remove a field.
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum MessagesCommands {
    /// Send a message to a technician.
    Send {
        technician: String,
        message: String,
        /// Mark the message urgent
        #[arg(long)]
        urgent: bool,
    },
    /// Show a conversation (or unread counts for every technician).
    Inbox { technician: Option<String> },
    /// Unread message counts per conversation.
    Unread,
    /// Mark a conversation read.
    Read { technician: String },
}

#[derive(Subcommand)]
pub enum SuppliesCommands {
    /// List inventory grouped by category.
    List {
        /// Include retired items
        #[arg(long)]
        all: bool,
        /// Only one category
        #[arg(long)]
        category: Option<String>,
    },
    /// Add an inventory item.
    Add {
        name: String,
        /// Category: Springs, Openers, Hardware, Weather Stripping, Safety, Security, Tools, Other
        #[arg(long)]
        category: String,
        #[arg(long = "part-number")]
        part_number: Option<String>,
        /// What the company pays per unit
        #[arg(long = "purchase-price")]
        purchase_price: f64,
        /// Markup percentage applied for the tech price
        #[arg(long, default_value = "25")]
        markup: f64,
        /// Override the computed tech price
        #[arg(long = "tech-price")]
        tech_price: Option<f64>,
        #[arg(long, default_value = "0")]
        stock: i64,
        /// Reorder threshold
        #[arg(long = "min-stock", default_value = "0")]
        min_stock: i64,
        #[arg(long)]
        supplier: Option<String>,
    },
    /// Adjust stock by a signed delta (e.g. -3 after a job).
    Adjust { name: String, delta: i64 },
    /// Update purchase price and markup.
    Prices {
        name: String,
        #[arg(long = "purchase-price")]
        purchase_price: f64,
        #[arg(long)]
        markup: f64,
    },
    /// Set the reorder threshold.
    MinStock { name: String, level: i64 },
    /// Retire an item from the active inventory.
    Retire { name: String },
    /// Bring a retired item back.
    Restore { name: String },
    /// Items at or below their reorder threshold.
    Low,
}

#[derive(Subcommand)]
pub enum RolesCommands {
    /// List roles and their permission counts.
    List,
    /// Show a role's full permission set.
    Show { name: String },
    /// Add a role.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Permission keys, comma-separated
        #[arg(long, value_delimiter = ',')]
        permissions: Vec<String>,
    },
    /// Grant one permission to a role.
    Grant { role: String, permission: String },
    /// Revoke one permission from a role.
    Revoke { role: String, permission: String },
    /// Remove a role (system roles are protected).
    Remove { name: String },
    /// Print the permission catalog.
    Permissions,
}

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List users.
    List,
    /// Add a user.
    Add {
        name: String,
        email: String,
        /// Role name (owner, admin, dispatcher, technician, or custom)
        #[arg(long, default_value = "dispatcher")]
        role: String,
    },
    /// Change a user's role.
    Role { email: String, role: String },
    /// Show the permissions a user's role grants.
    Permissions { email: String },
    /// Deactivate a user.
    Deactivate { email: String },
    /// Reactivate a user.
    Activate { email: String },
    /// Remove a user.
    Remove { email: String },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show settings and the company profile.
    Show,
    /// Set one settings key.
    Set { key: String, value: String },
    /// Update the company profile.
    Company {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the raw job sheet to CSV.
    Jobs {
        /// Output path
        path: String,
    },
    /// Export the customer roll-up to CSV.
    Customers {
        /// Output path
        path: String,
    },
}

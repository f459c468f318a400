mod board;
mod classify;
mod cli;
mod db;
mod error;
mod fmt;
mod forms;
mod importer;
mod jobs;
mod messages;
mod models;
mod permissions;
mod reports;
mod rollup;
mod roster;
mod settings;
mod sheet;
mod stages;
mod supplies;
mod tui;

use clap::Parser;

use cli::{
    Cli, Commands, CustomersCommands, ExportCommands, FormsCommands, JobsCommands,
    MessagesCommands, RolesCommands, SettingsCommands, StagesCommands, SuppliesCommands,
    TechsCommands, UsersCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Jobs { command }) => match command {
            JobsCommands::List { stage, search, all } => {
                cli::jobs::list(stage.as_deref(), search.as_deref(), all)
            }
            JobsCommands::Show { count } => cli::jobs::show(&count),
            JobsCommands::Add {
                client,
                phone,
                email,
                address,
                date,
                technician,
                lp,
                sales,
                status,
                notes,
            } => cli::jobs::add(
                &client,
                phone.as_deref(),
                email.as_deref(),
                address.as_deref(),
                date.as_deref(),
                technician.as_deref(),
                lp.as_deref(),
                sales.as_deref(),
                status.as_deref(),
                notes.as_deref(),
            ),
            JobsCommands::Edit { count, column, value } => cli::jobs::edit(&count, &column, &value),
            JobsCommands::Status { count, stage } => cli::jobs::status(&count, &stage),
            JobsCommands::Assign { count, technicians } => cli::jobs::assign(&count, &technicians),
            JobsCommands::Delete { count } => cli::jobs::delete(&count),
            JobsCommands::Restore { count } => cli::jobs::restore(&count),
            JobsCommands::Purge { count } => cli::jobs::purge(&count),
            JobsCommands::Trash => cli::jobs::trash(),
        },
        Some(Commands::Customers { command }) => match command {
            CustomersCommands::List => cli::customers::list(),
            CustomersCommands::Show { name } => cli::customers::show(&name),
        },
        Some(Commands::Techs { command }) => match command {
            TechsCommands::List { all } => cli::techs::list(all),
            TechsCommands::Add { name, email, phone, rate } => {
                cli::techs::add(&name, email.as_deref(), phone.as_deref(), rate)
            }
            TechsCommands::Rate { name, rate } => cli::techs::rate(&name, rate),
            TechsCommands::Contact { name, email, phone } => {
                cli::techs::contact(&name, email.as_deref(), phone.as_deref())
            }
            TechsCommands::Stats => cli::techs::stats(),
            TechsCommands::Deactivate { name } => cli::techs::deactivate(&name),
            TechsCommands::Activate { name } => cli::techs::activate(&name),
            TechsCommands::Remove { name } => cli::techs::remove(&name),
        },
        Some(Commands::Board { interactive }) => cli::board::run(interactive),
        Some(Commands::Schedule { days }) => cli::schedule::run(days),
        Some(Commands::Dashboard { period }) => cli::dashboard::run(&period),
        Some(Commands::Stages { command }) => match command {
            StagesCommands::List => cli::stages::list(),
            StagesCommands::Add { name, color } => cli::stages::add(&name, color.as_deref()),
            StagesCommands::Rename { name, new_name } => cli::stages::rename(&name, &new_name),
            StagesCommands::Color { name, color } => cli::stages::color(&name, &color),
            StagesCommands::Reorder { name, position } => cli::stages::reorder(&name, position),
            StagesCommands::Remove { name } => cli::stages::remove(&name),
        },
        Some(Commands::Forms { command }) => match command {
            FormsCommands::List => cli::forms::list(),
            FormsCommands::Add { name, label, field_type, required, options } => {
                cli::forms::add(&name, label.as_deref(), &field_type, required, &options)
            }
            FormsCommands::Label { name, label } => cli::forms::label(&name, &label),
            FormsCommands::Require { name } => cli::forms::require(&name),
            FormsCommands::Unrequire { name } => cli::forms::unrequire(&name),
            FormsCommands::Options { name, options } => cli::forms::options(&name, &options),
            FormsCommands::Reorder { name, position } => cli::forms::reorder(&name, position),
            FormsCommands::Remove { name } => cli::forms::remove(&name),
        },
        Some(Commands::Messages { command }) => match command {
            MessagesCommands::Send { technician, message, urgent } => {
                cli::messages::send(&technician, &message, urgent)
            }
            MessagesCommands::Inbox { technician } => cli::messages::inbox(technician.as_deref()),
            MessagesCommands::Unread => cli::messages::unread(),
            MessagesCommands::Read { technician } => cli::messages::read(&technician),
        },
        Some(Commands::Supplies { command }) => match command {
            SuppliesCommands::List { all, category } => cli::supplies::list(all, category.as_deref()),
            SuppliesCommands::Add {
                name,
                category,
                part_number,
                purchase_price,
                markup,
                tech_price,
                stock,
                min_stock,
                supplier,
            } => cli::supplies::add(
                &name,
                &category,
                part_number.as_deref(),
                purchase_price,
                markup,
                tech_price,
                stock,
                min_stock,
                supplier.as_deref(),
            ),
            SuppliesCommands::Adjust { name, delta } => cli::supplies::adjust(&name, delta),
            SuppliesCommands::Prices { name, purchase_price, markup } => {
                cli::supplies::prices(&name, purchase_price, markup)
            }
            SuppliesCommands::MinStock { name, level } => cli::supplies::min_stock(&name, level),
            SuppliesCommands::Retire { name } => cli::supplies::retire(&name),
            SuppliesCommands::Restore { name } => cli::supplies::restore(&name),
            SuppliesCommands::Low => cli::supplies::low(),
        },
        Some(Commands::Roles { command }) => match command {
            RolesCommands::List => cli::roles::list(),
            RolesCommands::Show { name } => cli::roles::show(&name),
            RolesCommands::Add { name, description, permissions } => {
                cli::roles::add(&name, &description, &permissions)
            }
            RolesCommands::Grant { role, permission } => cli::roles::grant(&role, &permission),
            RolesCommands::Revoke { role, permission } => cli::roles::revoke(&role, &permission),
            RolesCommands::Remove { name } => cli::roles::remove(&name),
            RolesCommands::Permissions => cli::roles::permissions_catalog(),
        },
        Some(Commands::Users { command }) => match command {
            UsersCommands::List => cli::users::list(),
            UsersCommands::Add { name, email, role } => cli::users::add(&name, &email, &role),
            UsersCommands::Role { email, role } => cli::users::role(&email, &role),
            UsersCommands::Permissions { email } => cli::users::permissions(&email),
            UsersCommands::Deactivate { email } => cli::users::deactivate(&email),
            UsersCommands::Activate { email } => cli::users::activate(&email),
            UsersCommands::Remove { email } => cli::users::remove(&email),
        },
        Some(Commands::Settings { command }) => match command {
            SettingsCommands::Show => cli::settings::show(),
            SettingsCommands::Set { key, value } => cli::settings::set(&key, &value),
            SettingsCommands::Company { name, phone, address, email, website } => {
                cli::settings::company(
                    name.as_deref(),
                    phone.as_deref(),
                    address.as_deref(),
                    email.as_deref(),
                    website.as_deref(),
                )
            }
        },
        Some(Commands::Import { file, format, force }) => {
            cli::import::run(&file, format.as_deref(), force)
        }
        Some(Commands::Export { command }) => match command {
            ExportCommands::Jobs { path } => cli::export::jobs(&path),
            ExportCommands::Customers { path } => cli::export::customers(&path),
        },
        Some(Commands::Demo) => cli::demo::run(),
        Some(Commands::Backup { output }) => cli::backup::run(output),
        Some(Commands::Status) => cli::status::run(),
        Some(Commands::Completions { shell }) => cli::completions::run(shell),
        None => cli::dashboard::run("all"),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

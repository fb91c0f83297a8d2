// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use circulation_ledger::{
    Book, Ledger, LedgerError, Loan, Outcome, Patron, SnapshotError, snapshot::format_due_date,
};
use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Library Circulation - Manage a library's catalog, patrons and loans
///
/// Every command loads the snapshot file (an absent file is an empty
/// library), applies one operation, and saves again if anything changed.
#[derive(Parser, Debug)]
#[command(name = "circulation-ledger")]
#[command(about = "A library circulation ledger", long_about = None)]
struct Args {
    /// Snapshot file holding the ledger state
    #[arg(long, global = true, value_name = "FILE", default_value = "library_data.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a title to the catalog
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        quantity: u32,
    },
    /// Add titles from a CSV file
    ///
    /// Expected format: title,author,isbn,quantity
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Print every cataloged title
    List,
    /// Print titles containing QUERY, ignoring case
    Search { query: String },
    /// Register a patron
    AddPatron {
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        contact: String,
    },
    /// Lend the first title with ISBN to the patron with ID
    Checkout {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        patron: String,
    },
    /// Remove the first title with ISBN from the catalog
    RemoveBook {
        #[arg(long)]
        isbn: String,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("reading CSV failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("opening '{path}' failed: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no book with ISBN {0}")]
    UnknownBook(String),

    #[error("no patron with ID {0}")]
    UnknownPatron(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args.data, args.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(data: &Path, command: Command) -> Result<(), CliError> {
    let mut ledger = open_ledger(data)?;

    match command {
        Command::AddBook {
            title,
            author,
            isbn,
            quantity,
        } => {
            ledger.add_book(Book::new(title, author, isbn, quantity));
            println!("Book added successfully.");
        }
        Command::Import { input } => {
            let file = std::fs::File::open(&input).map_err(|source| CliError::Open {
                path: input.clone(),
                source,
            })?;
            let added = import_books(&mut ledger, file)?;
            println!("Imported {} book(s).", added);
        }
        Command::List => {
            print!("{}", ledger.list_books_as_text());
            return Ok(());
        }
        Command::Search { query } => {
            for handle in ledger.search_by_title(&query) {
                if let Some(book) = ledger.book(handle) {
                    println!("{book}\n");
                }
            }
            return Ok(());
        }
        Command::AddPatron { name, id, contact } => {
            ledger.add_patron(Patron::new(name, id, contact));
            println!("Patron added successfully.");
        }
        Command::Checkout { isbn, patron } => {
            let book = ledger
                .find_book_by_isbn(&isbn)
                .ok_or_else(|| CliError::UnknownBook(isbn.clone()))?;
            let patron = ledger
                .find_patron_by_id(&patron)
                .ok_or_else(|| CliError::UnknownPatron(patron.clone()))?;

            // Refused checkouts are logged too, so save either way.
            match ledger.handle_transaction(Loan::new(book, patron))? {
                (loan, Outcome::Applied) => {
                    let due_date = ledger.loan(loan).and_then(Loan::due_date);
                    println!("Checked out, due {}.", format_due_date(due_date));
                }
                (_, Outcome::Refused(refusal)) => println!("{refusal}"),
            }
        }
        Command::RemoveBook { isbn } => {
            let book = ledger
                .find_book_by_isbn(&isbn)
                .ok_or_else(|| CliError::UnknownBook(isbn.clone()))?;
            ledger.remove_book(book)?;
            println!("Book removed.");
        }
    }

    ledger.save(data)?;
    Ok(())
}

/// Loads the ledger at `path`, or starts an empty one if the file is absent.
fn open_ledger(path: &Path) -> Result<Ledger, SnapshotError> {
    if path.exists() {
        Ledger::load(path)
    } else {
        tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
        Ok(Ledger::new())
    }
}

/// Raw CSV record matching the import format.
///
/// Fields: `title, author, isbn, quantity`
#[derive(Debug, Deserialize)]
struct CsvBook {
    title: String,
    author: String,
    isbn: String,
    quantity: u32,
}

/// Adds books from a CSV reader to the catalog, in file order.
///
/// Malformed rows (missing fields, non-numeric or negative quantity) are
/// skipped with a warning. Returns the number of books added.
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
fn import_books<R: Read>(ledger: &mut Ledger, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut added = 0;
    for result in rdr.deserialize::<CsvBook>() {
        match result {
            Ok(record) => {
                ledger.add_book(Book::new(
                    record.title,
                    record.author,
                    record.isbn,
                    record.quantity,
                ));
                added += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping malformed row: {}", e);
            }
        }
    }

    Ok(added)
}

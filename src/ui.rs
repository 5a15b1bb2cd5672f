//! Terminal output helpers. Pure formatting, no prompting.

pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message); // Red color
}

pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message); // Green color
}

pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message); // Yellow color
}

pub fn display_warning(message: &str) {
    println!("\x1b[33mWARNING:\x1b[0m {}", message);
}

/// Shows the version transition before the tag is created.
pub fn display_release_summary(previous: Option<&str>, next: &str) {
    match previous {
        Some(previous) => {
            println!("\n\x1b[1mProposed release:\x1b[0m");
            println!("  From: \x1b[31m{}\x1b[0m", previous);
            println!("  To:   \x1b[32m{}\x1b[0m", next);
        }
        None => {
            println!("\n\x1b[1mInitial release:\x1b[0m");
            println!("  New tag: \x1b[32m{}\x1b[0m", next);
        }
    }
}

//! Terminal rendering

use chrono::NaiveDate;

use taskboard_core::task::{Task, TaskStatus};

pub fn status_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::InProgress => "🔄",
        TaskStatus::Completed => "✨",
        TaskStatus::Pending => "⏳",
    }
}

/// "Today", "Yesterday", otherwise the ISO date
pub fn format_due_date(due: NaiveDate, today: NaiveDate) -> String {
    match (today - due).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => due.format("%Y-%m-%d").to_string(),
    }
}

pub fn task_line(task: &Task, today: NaiveDate) -> String {
    let due = task
        .due_date
        .map(|d| format_due_date(d, today))
        .unwrap_or_else(|| "no due date".to_string());
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} {} #{:<4} {}  ({} {}%, due {})",
        check,
        status_icon(task.status),
        task.id.to_string(),
        task.title,
        task.status,
        task.progress,
        due
    );
    if let Some(description) = &task.description {
        line.push_str("\n           ");
        line.push_str(description);
    }
    line
}

pub fn page(items: &[Task], total: usize, has_more: bool, today: NaiveDate) {
    println!();
    if items.is_empty() {
        println!("  (no tasks)");
    }
    for task in items {
        println!("  {}", task_line(task, today));
    }
    if has_more {
        println!("  -- {} of {} shown, `more` to load the next page --", items.len(), total);
    } else {
        println!("  -- {} of {} shown --", items.len(), total);
    }
}

pub fn banner() {
    println!("taskboard {}", env!("CARGO_PKG_VERSION"));
}

pub fn help() {
    println!("commands:");
    println!("  add <yyyy-mm-dd> <title>          create a task");
    println!("  edit <id> field=value ...         title= desc= due= status= progress=");
    println!("  delete <id>                       delete a task");
    println!("  toggle <id>                       flip completion");
    println!("  search [term]                     search titles (empty clears)");
    println!("  filter <all|pending|in-progress|completed>");
    println!("  more                              load the next page");
    println!("  list                              redraw");
    println!("  quit");
}

pub fn info(message: &str) {
    println!("  {}", message);
}

pub fn error(message: &str) {
    println!("  error: {}", message);
}

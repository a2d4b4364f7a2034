//! Some utility functions

use crate::calendar::{DayCell, Month};
use crate::snapshot::Snapshot;
use crate::task::Task;

/// A debug utility that pretty-prints a task
pub fn print_task(index: usize, task: &Task, completed: bool) {
    let completion = if completed { "✓" } else { " " };
    println!("  {:>3} {} {}\t(due {}, {}-{})\t{}",
        index, completion, task.text(),
        task.due_date().format("%Y-%m-%d %H:%M"),
        task.start_time().format("%H:%M"), task.end_time().format("%H:%M"),
        task.id());
    if task.notes().is_empty() == false {
        println!("          {}", task.notes());
    }
}

/// A debug utility that pretty-prints both partitions
pub fn print_snapshot(snapshot: &Snapshot) {
    println!("ACTIVE ({})", snapshot.active.len());
    for (index, task) in snapshot.active.iter().enumerate() {
        print_task(index, task, false);
    }
    println!("COMPLETED ({})", snapshot.completed.len());
    for (index, task) in snapshot.completed.iter().enumerate() {
        print_task(index, task, true);
    }
}

/// A debug utility that pretty-prints a month view. Days with tasks due are marked with a `*`
pub fn print_calendar(month: Month, active: &[Task]) {
    let buckets = crate::calendar::tasks_by_day(month, active);

    println!("{:^35}", month.to_string());
    println!("{}", ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"].iter().map(|d| format!("{:>5}", d)).collect::<String>());
    for week in month.days_in_grid().weeks() {
        let row: String = week.iter()
            .map(|cell| match cell {
                DayCell::Padding => format!("{:>5}", ""),
                DayCell::Day(d) => {
                    let mark = if buckets.contains_key(d) { "*" } else { " " };
                    format!("{:>4}{}", d, mark)
                },
            })
            .collect();
        println!("{}", row);
    }

    for (day, tasks) in &buckets {
        for task in tasks {
            println!("  {:>2}: {}", day, task.text());
        }
    }
}

use crate::models::employee::Employee;

/// Employees whose last name, first name or position contains `query`,
/// ignoring case. Input order is kept; an empty query keeps everything.
pub fn filter_employees<'a>(employees: &'a [Employee], query: &str) -> Vec<&'a Employee> {
    let needle = query.to_lowercase();
    employees
        .iter()
        .filter(|employee| matches(employee, &needle))
        .collect()
}

fn matches(employee: &Employee, needle: &str) -> bool {
    employee.last_name.to_lowercase().contains(needle)
        || employee.first_name.to_lowercase().contains(needle)
        || employee.position.to_lowercase().contains(needle)
}

/// Directory order: last name ascending, id as tie-break.
pub fn sort_by_last_name(employees: &mut [Employee]) {
    employees.sort_by(|a, b| a.last_name.cmp(&b.last_name).then_with(|| a.id.cmp(&b.id)));
}

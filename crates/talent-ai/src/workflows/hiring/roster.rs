//! Employee roster loaded from the HR CSV export.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::Employee;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to open employee roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid employee roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid last_working_day {value:?} for employee {id}")]
    InvalidDate { id: String, value: String },
    #[error("employee {0} not found in roster")]
    UnknownEmployee(String),
    #[error("no departing employee in roster")]
    NoDeparture,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeRoster {
    employees: Vec<Employee>,
}

impl EmployeeRoster {
    /// Columns: `id,name,position,department,salary,last_working_day,reason_for_leaving,office_location`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut employees = Vec::new();
        for record in csv_reader.deserialize::<EmployeeRow>() {
            employees.push(record?.into_employee()?);
        }
        Ok(Self { employees })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// First employee, in file order, with a last working day.
    pub fn departing(&self) -> Result<&Employee, RosterError> {
        self.employees
            .iter()
            .find(|employee| employee.last_working_day.is_some())
            .ok_or(RosterError::NoDeparture)
    }

    pub fn find(&self, id: &str) -> Result<&Employee, RosterError> {
        self.employees
            .iter()
            .find(|employee| employee.id == id)
            .ok_or_else(|| RosterError::UnknownEmployee(id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    id: String,
    name: String,
    position: String,
    department: String,
    salary: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    last_working_day: Option<String>,
    #[serde(default)]
    reason_for_leaving: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    office_location: Option<String>,
}

impl EmployeeRow {
    fn into_employee(self) -> Result<Employee, RosterError> {
        let last_working_day = match self.last_working_day {
            Some(value) => Some(NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
                RosterError::InvalidDate {
                    id: self.id.clone(),
                    value,
                }
            })?),
            None => None,
        };

        Ok(Employee {
            id: self.id,
            name: self.name,
            position: self.position,
            department: self.department,
            salary: self.salary,
            last_working_day,
            reason_for_leaving: self.reason_for_leaving,
            office_location: self.office_location,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
id,name,position,department,salary,last_working_day,reason_for_leaving,office_location
emp_001,John Doe,Senior Software Engineer,Engineering,85000,,,Pune
emp_002,Jane Smith,Data Scientist,Analytics,92000.50,2025-07-31,Relocation,
emp_003,Ravi Kumar,Product Manager,Product,105000,2025-08-15,Career growth,Bengaluru
";

    #[test]
    fn departing_picks_first_with_last_working_day() {
        let roster = EmployeeRoster::from_reader(ROSTER.as_bytes()).expect("roster parses");
        assert_eq!(roster.employees().len(), 3);

        let departing = roster.departing().expect("someone is leaving");
        assert_eq!(departing.id, "emp_002");
        assert_eq!(departing.salary, 92_000.5);
        assert_eq!(departing.location(), "Remote");
        assert_eq!(
            departing.last_working_day,
            NaiveDate::from_ymd_opt(2025, 7, 31)
        );
    }

    #[test]
    fn find_by_id_and_default_reason() {
        let roster = EmployeeRoster::from_reader(ROSTER.as_bytes()).expect("roster parses");
        let employee = roster.find("emp_001").expect("present");
        assert_eq!(employee.reason_for_leaving, "");
        assert_eq!(employee.location(), "Pune");
        assert!(matches!(
            roster.find("emp_404"),
            Err(RosterError::UnknownEmployee(id)) if id == "emp_404"
        ));
    }

    #[test]
    fn roster_without_departures_reports_it() {
        let csv = "id,name,position,department,salary,last_working_day,reason_for_leaving,office_location\n\
                   emp_001,John Doe,Engineer,Engineering,85000,,,\n";
        let roster = EmployeeRoster::from_reader(csv.as_bytes()).expect("parses");
        assert!(matches!(roster.departing(), Err(RosterError::NoDeparture)));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let csv = "id,name,position,department,salary,last_working_day,reason_for_leaving,office_location\n\
                   emp_009,Ann,Engineer,Engineering,85000,31/07/2025,,\n";
        assert!(matches!(
            EmployeeRoster::from_reader(csv.as_bytes()),
            Err(RosterError::InvalidDate { .. })
        ));
    }
}

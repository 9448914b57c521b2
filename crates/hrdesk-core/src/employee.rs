// ABOUTME: Employee record schema shared by the directory store and the data worker's tool.
// ABOUTME: Field names match the JSON handed to the language model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Remaining leave days by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalances {
    pub sick: u32,
    pub casual: u32,
    pub annual: u32,
}

/// A complete employee record. Lookups return the whole record or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub name: String,
    pub role: String,
    pub email: String,
    #[serde(rename = "dept")]
    pub department: String,
    pub salary: u32,
    pub hire_date: NaiveDate,
    pub leaves: LeaveBalances,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_directory_field_names() {
        let record: EmployeeRecord = serde_json::from_value(serde_json::json!({
            "name": "Raj Sharma",
            "role": "Engineer",
            "email": "raj.sharma@example.com",
            "dept": "IT",
            "salary": 50000,
            "hire_date": "2020-01-15",
            "leaves": {"sick": 8, "casual": 7, "annual": 12}
        }))
        .unwrap();

        assert_eq!(record.department, "IT");
        assert_eq!(record.hire_date, NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());
        assert_eq!(record.leaves.sick, 8);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["dept"], "IT");
        assert_eq!(back["hire_date"], "2020-01-15");
    }
}

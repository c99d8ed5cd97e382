use serde::{Deserialize, Serialize};

use super::ids::DoctorId;

/// A practitioner as stored in the relational store.
///
/// `available_times` keeps insertion order and may contain duplicates.
/// A slot being absent from the list is the only "booked" signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub specialization: Option<String>,
    #[serde(default)]
    pub available_times: Vec<String>,
}

/// A practitioner that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub name: String,
    pub specialization: Option<String>,
    #[serde(default)]
    pub available_times: Vec<String>,
}

impl NewDoctor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialization: None,
            available_times: Vec::new(),
        }
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = Some(specialization.into());
        self
    }

    pub fn with_available_times<I, S>(mut self, times: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_times = times.into_iter().map(Into::into).collect();
        self
    }
}

impl Doctor {
    /// Attaches a store-assigned id to a pending record.
    pub fn from_new(id: DoctorId, new: NewDoctor) -> Self {
        Self {
            id,
            name: new.name,
            specialization: new.specialization,
            available_times: new.available_times,
        }
    }

    pub fn available_times(&self) -> &[String] {
        &self.available_times
    }

    /// Replaces the whole slot list. There is no merge.
    pub fn set_available_times(&mut self, times: Vec<String>) {
        self.available_times = times;
    }

    pub fn add_available_time(&mut self, slot: impl Into<String>) {
        self.available_times.push(slot.into());
    }

    /// Removes the first occurrence of `slot`. Returns false if it was not offered.
    pub fn withdraw_available_time(&mut self, slot: &str) -> bool {
        match self.available_times.iter().position(|s| s == slot) {
            Some(index) => {
                self.available_times.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn offers(&self, slot: &str) -> bool {
        self.available_times.iter().any(|s| s == slot)
    }
}

/// Search criteria for doctors. Unset criteria match every doctor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Exact slot string that must be offered.
    pub time: Option<String>,
    /// Case-insensitive specialization.
    pub specialization: Option<String>,
}

impl DoctorFilter {
    pub fn name_criterion(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn time_criterion(&self) -> Option<&str> {
        non_blank(&self.time)
    }

    pub fn specialization_criterion(&self) -> Option<&str> {
        non_blank(&self.specialization)
    }

    pub fn matches(&self, doctor: &Doctor) -> bool {
        let name_ok = self.name_criterion().is_none_or(|name| {
            doctor
                .name
                .to_lowercase()
                .contains(&name.to_lowercase())
        });
        let time_ok = self.time_criterion().is_none_or(|time| doctor.offers(time));
        let specialization_ok = self.specialization_criterion().is_none_or(|wanted| {
            doctor
                .specialization
                .as_deref()
                .is_some_and(|s| s.to_lowercase() == wanted.to_lowercase())
        });

        name_ok && time_ok && specialization_ok
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

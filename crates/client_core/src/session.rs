//! Session state owned by the sync controller.

use shared::domain::{CommitteeId, Filter, LanguageCode};

use crate::translations::TranslationTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitteeEntry {
    pub id: CommitteeId,
    pub name: String,
}

/// Ordered committee sequence for one filter, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitteeList {
    entries: Vec<CommitteeEntry>,
}

impl CommitteeList {
    pub fn from_entries(entries: Vec<CommitteeEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CommitteeEntry] {
        &self.entries
    }

    /// Wire form: the whole list, names only, in order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&CommitteeEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: CommitteeId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn get(&self, id: CommitteeId) -> Option<&CommitteeEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn first_named(&self, name: &str) -> Option<&CommitteeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub(crate) fn rename(&mut self, id: CommitteeId, name: &str) -> Option<String> {
        let entry = self.entries.iter_mut().find(|entry| entry.id == id)?;
        Some(std::mem::replace(&mut entry.name, name.to_string()))
    }
}

/// Rebuilds a list from freshly fetched names, keeping ids of surviving names.
///
/// Each fetched name takes the id of the first not-yet-claimed previous entry
/// with the same name; everything else gets a new id from `next_id`.
pub fn reconcile_ids(
    previous: &CommitteeList,
    names: Vec<String>,
    next_id: &mut u64,
) -> (CommitteeList, Vec<CommitteeId>) {
    let mut claimed = vec![false; previous.len()];
    let mut minted = Vec::new();
    let entries = names
        .into_iter()
        .map(|name| {
            let reused = previous
                .entries()
                .iter()
                .enumerate()
                .find(|(idx, entry)| !claimed[*idx] && entry.name == name)
                .map(|(idx, entry)| (idx, entry.id));
            let id = match reused {
                Some((idx, id)) => {
                    claimed[idx] = true;
                    id
                }
                None => {
                    let id = CommitteeId(*next_id);
                    *next_id += 1;
                    minted.push(id);
                    id
                }
            };
            CommitteeEntry { id, name }
        })
        .collect();
    (CommitteeList::from_entries(entries), minted)
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub filter: Filter,
    pub language: LanguageCode,
    pub committees: CommitteeList,
    /// Filter the cached list was fetched for; differs from `filter` after a failed switch.
    pub list_filter: Option<Filter>,
    pub translations: TranslationTable,
    pub last_scan: Option<String>,
    next_id: u64,
}

impl SessionState {
    pub fn new(language: LanguageCode) -> Self {
        Self {
            filter: Filter::default(),
            language,
            committees: CommitteeList::default(),
            list_filter: None,
            translations: TranslationTable::builtin_english(),
            last_scan: None,
            next_id: 1,
        }
    }

    /// Wholesale replacement after a successful reload. Returns ids minted for new names.
    pub fn replace_committees(&mut self, filter: Filter, names: Vec<String>) -> Vec<CommitteeId> {
        let previous = if self.list_filter == Some(filter) {
            std::mem::take(&mut self.committees)
        } else {
            CommitteeList::default()
        };
        let (list, minted) = reconcile_ids(&previous, names, &mut self.next_id);
        self.committees = list;
        self.list_filter = Some(filter);
        minted
    }

    pub fn is_list_current(&self) -> bool {
        self.list_filter == Some(self.filter)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

//! Partitioning of an ordered page sequence into invoice groups.
//!
//! Pages are visited in increasing index order. A page with a bill date opens
//! (or joins) the group for its own key and absorbs immediate neighbors of the
//! same account that lack a date. A page without a date borrows the key of an
//! immediate neighbor of the same account that has one, checking `i-1` before
//! `i+1`, and otherwise lands in its account's unresolved group.
//!
//! Fallback is one hop only: a dateless page two positions away from the
//! nearest dated page of its account is not absorbed.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::page::{InvoiceKey, PageMetadata};

/// Pages belonging to one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceGroup {
    pub key: InvoiceKey,
    /// Page indices, sorted ascending without duplicates.
    pub pages: Vec<usize>,
}

/// Invoice groups in the order their keys first received a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InvoiceGroups {
    groups: Vec<InvoiceGroup>,
}

impl InvoiceGroups {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &InvoiceGroup> {
        self.groups.iter()
    }

    /// Pages of the group with the given key.
    pub fn get(&self, key: &InvoiceKey) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|group| &group.key == key)
            .map(|group| group.pages.as_slice())
    }

    /// Total number of pages over all groups.
    pub fn page_count(&self) -> usize {
        self.groups.iter().map(|group| group.pages.len()).sum()
    }

    /// Groups sorted by key.
    pub fn sorted_by_key(&self) -> Vec<&InvoiceGroup> {
        let mut sorted: Vec<&InvoiceGroup> = self.groups.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        sorted
    }

    /// Whether every index in `[0, page_count)` appears in exactly one group.
    pub fn is_partition_of(&self, page_count: usize) -> bool {
        let mut seen = vec![false; page_count];
        for page in self.groups.iter().flat_map(|group| group.pages.iter()) {
            match seen.get_mut(*page) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }
}

impl<'a> IntoIterator for &'a InvoiceGroups {
    type Item = &'a InvoiceGroup;
    type IntoIter = std::slice::Iter<'a, InvoiceGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Accumulates page assignments while preserving first-seen key order.
struct GroupBuilder {
    groups: Vec<InvoiceGroup>,
    index: HashMap<InvoiceKey, usize>,
    assigned: Vec<bool>,
}

impl GroupBuilder {
    fn new(page_count: usize) -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
            assigned: vec![false; page_count],
        }
    }

    fn is_assigned(&self, page: usize) -> bool {
        self.assigned[page]
    }

    fn assign(&mut self, key: &InvoiceKey, page: usize) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.groups.push(InvoiceGroup {
                    key: key.clone(),
                    pages: Vec::new(),
                });
                self.index.insert(key.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        trace!("page {} -> {}", page, key);
        self.groups[slot].pages.push(page);
        self.assigned[page] = true;
    }

    fn finish(mut self) -> InvoiceGroups {
        for group in &mut self.groups {
            group.pages.sort_unstable();
            group.pages.dedup();
        }
        InvoiceGroups {
            groups: self.groups,
        }
    }
}

/// Immediate neighbors of `page`, previous first.
fn neighbors(page: usize, page_count: usize) -> impl Iterator<Item = usize> {
    [page.checked_sub(1), page.checked_add(1).filter(|&j| j < page_count)]
        .into_iter()
        .flatten()
}

/// Group pages using the ±1 neighbor fallback for missing bill dates.
pub fn group_pages_with_fallback(metadata: &[PageMetadata]) -> InvoiceGroups {
    let page_count = metadata.len();
    let mut builder = GroupBuilder::new(page_count);

    for (i, meta) in metadata.iter().enumerate() {
        if builder.is_assigned(i) {
            continue;
        }

        if meta.has_bill_date() {
            let key = meta.key();
            builder.assign(&key, i);

            for j in neighbors(i, page_count) {
                let neighbor = &metadata[j];
                if !builder.is_assigned(j)
                    && neighbor.account_number == meta.account_number
                    && !neighbor.has_bill_date()
                {
                    debug!("Page {} absorbed into {} from page {}", j, key, i);
                    builder.assign(&key, j);
                }
            }
        } else {
            let borrowed = neighbors(i, page_count).find(|&j| {
                let neighbor = &metadata[j];
                neighbor.account_number == meta.account_number && neighbor.has_bill_date()
            });

            match borrowed {
                Some(j) => {
                    let key = metadata[j].key();
                    debug!("Page {} borrows {} from page {}", i, key, j);
                    builder.assign(&key, i);
                }
                None => {
                    let key = InvoiceKey::unresolved(meta.account_number.clone());
                    debug!("Page {} unresolved, grouped under {}", i, key);
                    builder.assign(&key, i);
                }
            }
        }
    }

    let groups = builder.finish();
    debug!("Grouped {} pages into {} invoices", page_count, groups.len());
    groups
}

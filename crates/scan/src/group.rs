use hashbrown::HashMap;
use twin_fs::FileRecord;

/// What makes two records "the same" for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupKey {
    #[default]
    Digest,
    Name,
}

/// Records sharing a key. Always has at least two members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: String,
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Bytes that could be reclaimed by keeping only one member.
    pub fn redundant_bytes(&self) -> u64 {
        self.members.iter().skip(1).map(|r| r.size).sum()
    }
}

pub fn group(records: impl IntoIterator<Item = FileRecord>, by: GroupKey) -> Vec<DuplicateGroup> {
    match by {
        GroupKey::Digest => group_by_digest(records),
        GroupKey::Name => group_by_name(records),
    }
}

/// Group by content digest. Records without a digest are left out.
pub fn group_by_digest(records: impl IntoIterator<Item = FileRecord>) -> Vec<DuplicateGroup> {
    group_by(records, |r| r.digest.clone())
}

pub fn group_by_name(records: impl IntoIterator<Item = FileRecord>) -> Vec<DuplicateGroup> {
    group_by(records, |r| Some(r.name.clone()))
}

/// Groups come out ordered by their first member; members keep input order.
fn group_by<F>(records: impl IntoIterator<Item = FileRecord>, key: F) -> Vec<DuplicateGroup>
where
    F: Fn(&FileRecord) -> Option<String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for record in records {
        let Some(k) = key(&record) else { continue };

        match index.get(&k) {
            Some(&slot) => groups[slot].members.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key: k,
                    members: vec![record],
                });
            }
        }
    }

    groups.retain(|g| g.members.len() > 1);
    groups
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;

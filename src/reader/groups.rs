//! An iterator over runs of records that place one read onto one contig.

use std::io::BufRead;

use crate::alignment::Alignment;
use crate::mapping;
use crate::mapping::Mapping;
use crate::reader;
use crate::record::AssembledFrom;
use crate::Reader;

/// The records placing one read onto one contig.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    /// The contig id.
    contig_id: u64,

    /// The read id.
    read_id: u64,

    /// The records, in file order (never empty).
    records: Vec<AssembledFrom>,
}

impl Group {
    /// Starts a group from its first record.
    fn new(record: AssembledFrom) -> Self {
        Self {
            contig_id: record.contig_id(),
            read_id: record.read_id(),
            records: vec![record],
        }
    }

    /// Returns whether a record belongs to this group.
    fn accepts(&self, record: &AssembledFrom) -> bool {
        record.contig_id() == self.contig_id && record.read_id() == self.read_id
    }

    /// Gets the contig id.
    pub fn contig_id(&self) -> u64 {
        self.contig_id
    }

    /// Gets the read id.
    pub fn read_id(&self) -> u64 {
        self.read_id
    }

    /// Gets the records.
    pub fn records(&self) -> &[AssembledFrom] {
        &self.records
    }

    /// Gets the alignments the records describe.
    pub fn alignments(&self) -> Vec<Alignment> {
        self.records.iter().map(AssembledFrom::to_alignment).collect()
    }

    /// Attempts to turn the group into a [`Mapping`] of the read onto the
    /// contig.
    ///
    /// # Examples
    ///
    /// ```
    /// use contigmap::core::Direction;
    /// use contigmap::core::Translate as _;
    ///
    /// let data = b"1\t7\t22\t18\t1\t5\n1\t7\t14\t10\t6\t10\n";
    /// let mut reader = contigmap::Reader::new(&data[..]);
    ///
    /// let group = reader.groups().next().unwrap()?;
    /// let mapping = group.into_mapping()?;
    ///
    /// assert_eq!(mapping.direction(), Direction::Reverse);
    /// assert_eq!(mapping.reference_position(6), Some(14));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn into_mapping(self) -> Result<Mapping, mapping::Error> {
        Mapping::try_new(self.read_id, self.contig_id, self.alignments())
    }
}

/// An iterator over the [`Group`]s of a [`Reader`].
///
/// Records are grouped only while they are consecutive; a read whose records
/// are interleaved with another read's yields several groups.
#[derive(Debug)]
pub struct Groups<'a, T>
where
    T: BufRead,
{
    /// The inner reader.
    reader: &'a mut Reader<T>,

    /// The record that ended the previous group.
    pending: Option<AssembledFrom>,

    /// The line buffer.
    buffer: String,
}

impl<'a, T> Groups<'a, T>
where
    T: BufRead,
{
    /// Creates a new [`Groups`].
    pub(crate) fn new(reader: &'a mut Reader<T>) -> Self {
        Self {
            reader,
            pending: None,
            buffer: String::new(),
        }
    }
}

impl<T> Iterator for Groups<'_, T>
where
    T: BufRead,
{
    type Item = Result<Group, reader::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut group = self.pending.take().map(Group::new);

        loop {
            let record = match self.reader.read_record(&mut self.buffer) {
                Ok(Some(record)) => record,
                Ok(None) => return group.map(Ok),
                Err(err) => return Some(Err(err)),
            };

            match group.as_mut() {
                None => group = Some(Group::new(record)),
                Some(current) if current.accepts(&record) => current.records.push(record),
                Some(_) => {
                    self.pending = Some(record);
                    return group.map(Ok);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_records_are_grouped() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"# contig 1\n\
                     1\t7\t22\t18\t1\t5\n\
                     \n\
                     1\t7\t14\t10\t6\t10\n\
                     1\t8\t1\t4\t1\t4\n\
                     2\t8\t5\t8\t1\t4\n";
        let mut reader = Reader::new(&data[..]);

        let groups = reader.groups().collect::<Result<Vec<_>, _>>()?;
        let keys = groups
            .iter()
            .map(|group| (group.contig_id(), group.read_id(), group.records().len()))
            .collect::<Vec<_>>();

        assert_eq!(keys, [(1, 7, 2), (1, 8, 1), (2, 8, 1)]);

        Ok(())
    }

    #[test]
    fn an_empty_file_has_no_groups() {
        let data = b"# nothing here\n\n";
        let mut reader = Reader::new(&data[..]);
        assert!(reader.groups().next().is_none());
    }

    #[test]
    fn errors_are_surfaced() {
        let data = b"1\t7\t22\t18\t1\t5\n1\t7\n";
        let mut reader = Reader::new(&data[..]);

        let mut groups = reader.groups();
        assert!(groups.next().unwrap().is_err());
    }

    #[test]
    fn mixed_directions_do_not_form_a_mapping() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"1\t7\t1\t5\t1\t5\n1\t7\t20\t16\t6\t10\n";
        let mut reader = Reader::new(&data[..]);

        let group = reader.groups().next().unwrap()?;
        assert_eq!(group.alignments().len(), 2);
        assert_eq!(group.into_mapping(), Err(mapping::Error::MixedDirections));

        Ok(())
    }
}

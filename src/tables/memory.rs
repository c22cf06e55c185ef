/// 目标表的内存实现
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::{
    DeformerTable, EstKey, ImcKind, MetaTargets, ParameterTable, SkeletonTable, VariantTable,
    PARAMETER_ENTRY_SIZE,
};
use crate::metafile::ImcEntry;

/// 内存 IMC 表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryVariantTable {
    pub kind: ImcKind,
    pub set_count: usize,
    pub entries: Vec<ImcEntry>,
}

impl MemoryVariantTable {
    pub fn new(kind: ImcKind) -> Self {
        let mut table = MemoryVariantTable {
            kind,
            ..Default::default()
        };
        table.resize(0);
        table
    }

    pub fn entry(&self, index: usize) -> Option<&ImcEntry> {
        self.entries.get(index)
    }
}

impl VariantTable for MemoryVariantTable {
    fn kind(&self) -> ImcKind {
        self.kind
    }

    fn set_kind(&mut self, kind: ImcKind) {
        self.kind = kind;
        let len = (self.set_count + 1) * self.entries_per_set();
        if self.entries.len() < len {
            self.entries.resize(len, ImcEntry::default());
        }
    }

    fn set_count(&self) -> usize {
        self.set_count
    }

    fn resize(&mut self, set_count: usize) {
        self.set_count = set_count;
        self.entries
            .resize((set_count + 1) * self.entries_per_set(), ImcEntry::default());
    }

    fn set_entry(&mut self, index: usize, entry: ImcEntry) {
        if index >= self.entries.len() {
            self.entries.resize(index + 1, ImcEntry::default());
        }
        self.entries[index] = entry;
    }
}

/// 内存 EQDP 表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryDeformerTable {
    pub values: BTreeMap<u16, u16>,
}

impl DeformerTable for MemoryDeformerTable {
    fn get(&self, set_id: u16) -> u16 {
        self.values.get(&set_id).copied().unwrap_or(0)
    }

    fn set(&mut self, set_id: u16, value: u16) {
        self.values.insert(set_id, value);
    }
}

/// 内存 EQP/GMP 表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoryParameterTable {
    pub entries: BTreeMap<u16, [u8; PARAMETER_ENTRY_SIZE]>,
}

impl ParameterTable for MemoryParameterTable {
    fn entry_mut(&mut self, set_id: u16) -> &mut [u8; PARAMETER_ENTRY_SIZE] {
        self.entries.entry(set_id).or_insert([0; PARAMETER_ENTRY_SIZE])
    }
}

/// 内存 EST 表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySkeletonTable {
    pub entries: BTreeMap<EstKey, u16>,
    /// 整表替换次数
    pub replace_count: usize,
}

impl SkeletonTable for MemorySkeletonTable {
    fn entries(&self) -> BTreeMap<EstKey, u16> {
        self.entries.clone()
    }

    fn replace_entries(&mut self, entries: BTreeMap<EstKey, u16>) {
        self.entries = entries;
        self.replace_count += 1;
    }
}

impl Serialize for MemorySkeletonTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // JSON 对象键必须是字符串，这里展开为列表
        #[derive(Serialize)]
        struct Row {
            set_id: u16,
            race_code: u16,
            skel_id: u16,
        }
        let rows: Vec<Row> = self
            .entries
            .iter()
            .map(|(key, &skel_id)| Row {
                set_id: key.set_id,
                race_code: key.race_code,
                skel_id,
            })
            .collect();
        rows.serialize(serializer)
    }
}

/// 一组按路径索引的内存目标表，不存在的表在首次访问时创建
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryTargets {
    pub variant_tables: HashMap<String, MemoryVariantTable>,
    pub deformer_tables: HashMap<String, MemoryDeformerTable>,
    pub parameter_tables: HashMap<String, MemoryParameterTable>,
    pub skeleton_tables: HashMap<String, MemorySkeletonTable>,
}

impl MemoryTargets {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetaTargets for MemoryTargets {
    fn variant_table(&mut self, path: &str) -> &mut dyn VariantTable {
        self.variant_tables
            .entry(path.to_string())
            .or_insert_with(|| MemoryVariantTable::new(ImcKind::Unknown))
    }

    fn deformer_table(&mut self, path: &str) -> &mut dyn DeformerTable {
        self.deformer_tables.entry(path.to_string()).or_default()
    }

    fn parameter_table(&mut self, path: &str) -> &mut dyn ParameterTable {
        self.parameter_tables.entry(path.to_string()).or_default()
    }

    fn skeleton_table(&mut self, path: &str) -> &mut dyn SkeletonTable {
        self.skeleton_tables.entry(path.to_string()).or_default()
    }
}

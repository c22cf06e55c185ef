/// 补丁分发
///
/// 将元数据中的各类编辑块应用到调用方提供的目标表上。
/// 每个例程在对应编辑块不存在时不做任何事情。
///
/// 目标表原地修改（读-改-写），同一目标表的并发写入需要调用方串行化。
/// 失败时不回滚，已应用的修改保留。
use super::{EqdpEntry, EstEntry, ImcEntry, MetaDataType, MetaFile};
use crate::tables::{
    eqdp_path, est_path, DeformerTable, EstKey, ImcKind, MetaTargets, ParameterTable,
    SkeletonTable, VariantTable, EQP_PATH, GMP_PATH, PARAMETER_ENTRY_SIZE,
};
use crate::utils::MetaError;

impl MetaFile {
    /// 应用 IMC 编辑
    ///
    /// 第 0 条记录写入基础组，因此有效组数为记录数减一。
    pub fn apply_imc(&self, table: &mut dyn VariantTable) {
        let span = self.get_span::<ImcEntry>(MetaDataType::Imc);
        if span.is_empty() {
            return;
        }

        // 类别按主类型判断，槽位无法识别的装备路径同样按组存放
        if table.kind() == ImcKind::Unknown {
            let kind = if self.identity().is_gear_category() {
                ImcKind::Set
            } else {
                ImcKind::NonSet
            };
            table.set_kind(kind);
        }

        let set_count = span.len() - 1;
        if table.set_count() < set_count {
            table.resize(set_count);
        }

        let entries_per_set = table.entries_per_set();
        for (i, entry) in span.iter().enumerate() {
            table.set_entry(i * entries_per_set + self.slot_index(), entry);
        }

        log::debug!("{}: 写入 {} 条 IMC 记录", self.target_path(), span.len());
    }

    /// 应用 EQDP 编辑
    ///
    /// 每条记录对应一个种族的变形器表，在该表 PrimaryId 的值中替换当前槽位的 2 位。
    pub fn apply_eqdp(&self, targets: &mut dyn MetaTargets) {
        let span = self.get_span::<EqdpEntry>(MetaDataType::Eqdp);
        if span.is_empty() {
            return;
        }

        let shift = self.slot_index() * 2;
        let mask = 0b11u16 << shift;

        for entry in span.iter() {
            let Some(path) = eqdp_path(self.item_type(), entry.race_code) else {
                log::warn!(
                    "{}: 类别 {:?} 没有变形器表，忽略 EQDP 编辑",
                    self.target_path(),
                    self.item_type()
                );
                return;
            };

            let table: &mut dyn DeformerTable = targets.deformer_table(&path);
            let current = table.get(self.primary_id());
            let value = (current & !mask) | ((u16::from(entry.value) << shift) & mask);
            table.set(self.primary_id(), value);
        }

        log::debug!("{}: 写入 {} 条 EQDP 记录", self.target_path(), span.len());
    }

    /// 应用 EQP 编辑
    ///
    /// # 错误
    /// 编辑块长度与当前槽位的条目大小不一致时返回 `MetaError::Format`，目标表不被修改
    pub fn apply_eqp(&self, table: &mut dyn ParameterTable) -> Result<(), MetaError> {
        let bytes = self.get_span::<u8>(MetaDataType::Eqp).as_bytes();
        if bytes.is_empty() {
            return Ok(());
        }

        let size = self.identity().eqp_entry_size;
        let offset = self.identity().eqp_entry_offset;
        if bytes.len() != size {
            return Err(MetaError::format(format!(
                "EQP entry size mismatch: expected {} bytes, found {}",
                size,
                bytes.len()
            )));
        }

        let entry = table.entry_mut(self.primary_id());
        entry[offset..offset + size].copy_from_slice(bytes);

        log::debug!("{}: 写入 EQP 条目 ({} 字节, 偏移 {})", self.target_path(), size, offset);
        Ok(())
    }

    /// 应用 GMP 编辑
    ///
    /// # 错误
    /// 编辑块不是 8 字节时返回 `MetaError::Format`，目标表不被修改
    pub fn apply_gmp(&self, table: &mut dyn ParameterTable) -> Result<(), MetaError> {
        let bytes = self.get_span::<u8>(MetaDataType::Gmp).as_bytes();
        if bytes.is_empty() {
            return Ok(());
        }

        if bytes.len() != PARAMETER_ENTRY_SIZE {
            return Err(MetaError::format(format!(
                "GMP entry size mismatch: expected {} bytes, found {}",
                PARAMETER_ENTRY_SIZE,
                bytes.len()
            )));
        }

        table.entry_mut(self.primary_id()).copy_from_slice(bytes);

        log::debug!("{}: 写入 GMP 条目", self.target_path());
        Ok(())
    }

    /// 应用 EST 编辑
    ///
    /// 读取整张表，逐条更新后整表写回。SkelId 为 0 的记录删除对应键。
    pub fn apply_est(&self, table: &mut dyn SkeletonTable) {
        let span = self.get_span::<EstEntry>(MetaDataType::Est);
        if span.is_empty() {
            return;
        }

        let mut entries = table.entries();
        for entry in span.iter() {
            let key = EstKey {
                set_id: entry.set_id,
                race_code: entry.race_code,
            };
            if entry.skel_id == 0 {
                entries.remove(&key);
            } else {
                entries.insert(key, entry.skel_id);
            }
        }
        table.replace_entries(entries);

        log::debug!("{}: 写入 {} 条 EST 记录", self.target_path(), span.len());
    }

    /// 按固定顺序（IMC、EQDP、EQP、GMP、EST）应用全部编辑
    ///
    /// 目标表通过路径构造函数定位。遇到错误立即返回，此前的修改保留。
    pub fn apply_all(&self, targets: &mut dyn MetaTargets) -> Result<(), MetaError> {
        if self.has_entry(MetaDataType::Imc) && !self.target_imc_path().is_empty() {
            let path = self.target_imc_path().to_string();
            self.apply_imc(targets.variant_table(&path));
        }

        self.apply_eqdp(targets);

        if self.has_entry(MetaDataType::Eqp) {
            self.apply_eqp(targets.parameter_table(EQP_PATH))?;
        }
        if self.has_entry(MetaDataType::Gmp) {
            self.apply_gmp(targets.parameter_table(GMP_PATH))?;
        }

        if self.has_entry(MetaDataType::Est) {
            match est_path(self.est_type()) {
                Some(path) => self.apply_est(targets.skeleton_table(path)),
                None => log::warn!("{}: 没有对应的 EST 表，忽略 EST 编辑", self.target_path()),
            }
        }

        Ok(())
    }
}

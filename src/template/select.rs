/// 选项选择
///
/// 根据稀疏的用户选择文档（JSON）决定安装哪些条目。
///
/// 选择文档格式：`[页][组]`，组元素为单个索引或索引数组；
/// 缺失、null、非数组或长度不足的位置视为"全选"。
use serde_json::Value;
use std::collections::BTreeSet;

use super::model::{ModEntry, ModTemplate};
use crate::utils::MetaError;

/// 选中的 (页, 组, 选项) 位置
type Selection = (usize, usize, usize);

impl ModTemplate {
    /// 按固定顺序访问所有被选中的条目
    ///
    /// 1. `simple_mods_list` 中的条目无条件访问
    /// 2. 按数组位置遍历页、组；每组按升序访问被选中选项的全部条目
    ///
    /// 越界索引静默跳过；同一组内的重复索引只访问一次。
    ///
    /// # 错误
    /// 组元素既不是整数也不是整数数组时返回 `MetaError::Coercion`，
    /// 此时不会调用回调。
    pub fn for_each<F>(&self, choices: Option<&Value>, mut callback: F) -> Result<(), MetaError>
    where
        F: FnMut(&ModEntry),
    {
        let plan = self.selection_plan(choices)?;

        self.simple_mods_list.iter().for_each(&mut callback);
        for (page, group, option) in plan {
            let option = &self.mod_pack_pages[page].mod_groups[group].option_list[option];
            option.mods_jsons.iter().for_each(&mut callback);
        }

        Ok(())
    }

    /// 可变版本的 `for_each`，访问顺序完全一致，回调可以原地修改条目
    pub fn for_each_mut<F>(&mut self, choices: Option<&Value>, mut callback: F) -> Result<(), MetaError>
    where
        F: FnMut(&mut ModEntry),
    {
        let plan = self.selection_plan(choices)?;

        self.simple_mods_list.iter_mut().for_each(&mut callback);
        for (page, group, option) in plan {
            let option = &mut self.mod_pack_pages[page].mod_groups[group].option_list[option];
            option.mods_jsons.iter_mut().for_each(&mut callback);
        }

        Ok(())
    }

    /// 收集所有被选中条目的副本
    pub fn selected_entries(&self, choices: Option<&Value>) -> Result<Vec<ModEntry>, MetaError> {
        let mut entries = Vec::new();
        self.for_each(choices, |entry| entries.push(entry.clone()))?;
        Ok(entries)
    }

    /// 计算需要访问的选项位置
    fn selection_plan(&self, choices: Option<&Value>) -> Result<Vec<Selection>, MetaError> {
        let mut plan = Vec::new();

        for (page_pos, page) in self.mod_pack_pages.iter().enumerate() {
            let page_choice = element_at(choices, page_pos);

            for (group_pos, group) in page.mod_groups.iter().enumerate() {
                let group_choice = element_at(page_choice, group_pos);
                let option_count = group.option_list.len();

                for index in selected_indices(group_choice, option_count)? {
                    if index >= option_count {
                        log::debug!(
                            "页 {} 组 {} 的选项索引 {} 越界（共 {} 项），跳过",
                            page_pos,
                            group_pos,
                            index,
                            option_count
                        );
                        continue;
                    }
                    plan.push((page_pos, group_pos, index));
                }
            }
        }

        Ok(plan)
    }
}

/// 取数组中指定位置的元素；父元素缺失、不是数组或长度不足时返回 None
fn element_at(parent: Option<&Value>, position: usize) -> Option<&Value> {
    parent.and_then(Value::as_array).and_then(|items| items.get(position))
}

/// 解析一个组的选中索引集合（升序、去重）
///
/// 缺失或为 null 的组元素表示全选。
/// 负数索引视为越界，与其他越界索引一样被忽略。
fn selected_indices(choice: Option<&Value>, option_count: usize) -> Result<BTreeSet<usize>, MetaError> {
    let choice = match choice {
        None | Some(Value::Null) => return Ok((0..option_count).collect()),
        Some(choice) => choice,
    };

    let values: Vec<&Value> = match choice {
        Value::Array(items) => items.iter().collect(),
        scalar => vec![scalar],
    };

    let mut indices = BTreeSet::new();
    for value in values {
        if let Some(index) = coerce_index(value)? {
            indices.insert(index);
        }
    }
    Ok(indices)
}

/// 将选择值转换为索引；负数返回 None
///
/// 小数部分为零的浮点数（如 `1.0`）按整数处理。
fn coerce_index(value: &Value) -> Result<Option<usize>, MetaError> {
    if let Some(index) = value.as_u64() {
        return Ok(Some(usize::try_from(index).unwrap_or(usize::MAX)));
    }
    if value.as_i64().is_some() {
        return Ok(None);
    }
    if let Some(number) = value.as_f64().filter(|n| n.is_finite() && n.fract() == 0.0) {
        if number < 0.0 {
            return Ok(None);
        }
        return Ok(Some(if number >= usize::MAX as f64 { usize::MAX } else { number as usize }));
    }
    Err(MetaError::coercion(format!(
        "choice value {} is not an integer or an array of integers",
        value
    )))
}

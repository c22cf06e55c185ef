//! 元数据补丁与模组包模板的端到端测试
//!
//! 测试场景：
//! - 从解包目录加载 .meta 文件并应用到内存目标表
//! - 按选择文档遍历模板并按条目路径找到需要应用的元数据

use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use ttmp_meta::io::FsAssetReader;
use ttmp_meta::tables::{EstKey, ImcKind, MemoryTargets, EQP_PATH};
use ttmp_meta::{is_textools_metadata, MetaDataType, MetaError, MetaFile, ModTemplate};

const MET_PATH: &str = "chara/equipment/e0001/model/c0101e0001_met.meta";
const HAIR_PATH: &str = "chara/human/c0101/obj/hair/h0005/c0101h0005_hir.meta";

/// 构造元数据文件内容
fn build_meta(source_path: &str, blocks: &[(MetaDataType, Vec<u8>)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.write_u32::<LittleEndian>(2).unwrap();
    data.extend_from_slice(source_path.as_bytes());
    data.push(0);

    let first_locator = data.len() as u32 + 12;
    data.write_u32::<LittleEndian>(blocks.len() as u32).unwrap();
    data.write_u32::<LittleEndian>(12).unwrap();
    data.write_u32::<LittleEndian>(first_locator).unwrap();

    let mut offset = first_locator + 12 * blocks.len() as u32;
    for (entry_type, payload) in blocks {
        data.write_u32::<LittleEndian>(u32::from(*entry_type)).unwrap();
        data.write_u32::<LittleEndian>(offset).unwrap();
        data.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        offset += payload.len() as u32;
    }
    for (_, payload) in blocks {
        data.extend_from_slice(payload);
    }
    data
}

/// 把文件写到解包目录中对应的游戏路径
fn write_asset(root: &Path, game_path: &str, bytes: &[u8]) {
    let path = game_path.split('/').fold(root.to_path_buf(), |p, part| p.join(part));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_load_and_apply_equipment_meta() {
    let temp_dir = TempDir::new().unwrap();

    let mut eqdp = Vec::new();
    eqdp.write_u32::<LittleEndian>(101).unwrap();
    eqdp.push(0b10);

    let mut est = Vec::new();
    for value in [101u16, 1, 55] {
        est.write_u16::<LittleEndian>(value).unwrap();
    }

    let meta_bytes = build_meta(
        MET_PATH,
        &[
            (MetaDataType::Imc, vec![1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0]),
            (MetaDataType::Eqdp, eqdp),
            (MetaDataType::Eqp, vec![0x10, 0x20, 0x30]),
            (MetaDataType::Est, est),
            (MetaDataType::Unknown(1000), vec![0xEE; 4]),
        ],
    );
    write_asset(temp_dir.path(), MET_PATH, &meta_bytes);

    let reader = FsAssetReader::new(temp_dir.path());
    let meta = MetaFile::load(&reader, MET_PATH).unwrap();
    assert_eq!(meta.entries().len(), 5);

    let mut targets = MemoryTargets::new();
    meta.apply_all(&mut targets).unwrap();

    let imc = &targets.variant_tables["chara/equipment/e0001/model/e0001.imc"];
    assert_eq!(imc.kind, ImcKind::Set);
    assert_eq!(imc.set_count, 1);
    assert_eq!(imc.entries[0].material_id, 1);
    assert_eq!(imc.entries[5].material_id, 2);

    let eqdp = &targets.deformer_tables["chara/xls/charadb/equipmentdeformerparameter/c0101.eqdp"];
    assert_eq!(eqdp.values[&1], 0b10);

    assert_eq!(
        targets.parameter_tables[EQP_PATH].entries[&1],
        [0, 0, 0, 0, 0, 0x10, 0x20, 0x30]
    );

    let est = &targets.skeleton_tables["chara/xls/charadb/extra_met.est"];
    assert_eq!(est.entries[&EstKey { set_id: 1, race_code: 101 }], 55);

    let summary = serde_json::to_value(meta.summary()).unwrap();
    assert_eq!(summary["identity"]["est_type"], "Head");
}

#[test]
fn test_hair_meta_targets_hair_skeleton_table() {
    let temp_dir = TempDir::new().unwrap();

    let mut est = Vec::new();
    for value in [101u16, 5, 9] {
        est.write_u16::<LittleEndian>(value).unwrap();
    }
    write_asset(temp_dir.path(), HAIR_PATH, &build_meta(HAIR_PATH, &[(MetaDataType::Est, est)]));

    let meta = MetaFile::load(&FsAssetReader::new(temp_dir.path()), HAIR_PATH).unwrap();
    let mut targets = MemoryTargets::new();
    meta.apply_all(&mut targets).unwrap();

    let est = &targets.skeleton_tables["chara/xls/charadb/hairskeletontemplate.est"];
    assert_eq!(est.entries[&EstKey { set_id: 5, race_code: 101 }], 9);
    assert!(targets.variant_tables.is_empty());
}

#[test]
fn test_missing_meta_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = MetaFile::load(&FsAssetReader::new(temp_dir.path()), MET_PATH);
    assert!(matches!(result, Err(MetaError::IoError(_))));
}

#[test]
fn test_template_selection_drives_meta_application() {
    let temp_dir = TempDir::new().unwrap();
    let top_path = "chara/equipment/e0001/model/c0101e0001_top.meta";

    write_asset(
        temp_dir.path(),
        MET_PATH,
        &build_meta(MET_PATH, &[(MetaDataType::Gmp, vec![1, 2, 3, 4, 5, 6, 7, 8])]),
    );
    write_asset(
        temp_dir.path(),
        top_path,
        &build_meta(top_path, &[(MetaDataType::Eqp, vec![0xAA, 0xBB])]),
    );

    let template = ModTemplate::from_json_str(&format!(
        r#"{{
            "Name": "Integration",
            "ModPackPages": [
                {{
                    "PageIndex": 0,
                    "ModGroups": [
                        {{
                            "GroupName": "Parts",
                            "SelectionType": "Multi",
                            "OptionList": [
                                {{ "Name": "Head", "ModsJsons": [ {{ "FullPath": "{}" }} ] }},
                                {{ "Name": "Texture", "ModsJsons": [ {{ "FullPath": "chara/equipment/e0001/texture/v01_c0101e0001_met_d.tex" }} ] }},
                                {{ "Name": "Body", "ModsJsons": [ {{ "FullPath": "{}" }} ] }}
                            ]
                        }}
                    ]
                }}
            ]
        }}"#,
        MET_PATH, top_path
    ))
    .unwrap();

    let reader = FsAssetReader::new(temp_dir.path());
    let mut targets = MemoryTargets::new();
    let mut applied = Vec::new();

    let mut metas = Vec::new();
    template
        .for_each(Some(&json!([[[2, 0]]])), |entry| {
            if is_textools_metadata(&entry.full_path) {
                metas.push(entry.full_path.clone());
            }
        })
        .unwrap();

    for path in &metas {
        let meta = MetaFile::load(&reader, path).unwrap();
        meta.apply_all(&mut targets).unwrap();
        applied.push(path.clone());
    }

    assert_eq!(applied, vec![MET_PATH.to_string(), top_path.to_string()]);
    assert_eq!(
        targets.parameter_tables["chara/xls/equipmentparameter/gimmickparameter.gmp"].entries[&1],
        [1, 2, 3, 4, 5, 6, 7, 8]
    );
    assert_eq!(
        targets.parameter_tables[EQP_PATH].entries[&1],
        [0xAA, 0xBB, 0, 0, 0, 0, 0, 0]
    );
}

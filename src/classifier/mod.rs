// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::package::{PackageMetadata, PackageType};
use crate::hosting::traits::{ClientError, RepositoryClient};
use tracing::debug;

/// 包配置文件名
const GAME_CONF: &str = "game.conf";
const MODPACK_CONF: &str = "modpack.conf";
const MOD_CONF: &str = "mod.conf";
/// 兜底的modpack信号：非空的mods/目录
const MODS_FOLDER: &str = "mods";

/// 配置分类器
///
/// 按固定优先级探测约定的配置文件并解析出包类型与元数据。
/// game.conf最先检查：游戏仓库可能顺带携带mod.conf形状的
/// 文件，游戏身份优先。每一步只发一次get_file调用。
pub async fn classify(
    client: &dyn RepositoryClient,
    branch: Option<&str>,
) -> Result<(PackageType, PackageMetadata), ClientError> {
    if let Some(content) = client.get_file(GAME_CONF, branch).await? {
        return Ok((PackageType::Game, parse_conf(&content, PackageType::Game)));
    }
    if let Some(content) = client.get_file(MODPACK_CONF, branch).await? {
        return Ok((
            PackageType::Modpack,
            parse_conf(&content, PackageType::Modpack),
        ));
    }
    if let Some(content) = client.get_file(MOD_CONF, branch).await? {
        return Ok((PackageType::Mod, parse_conf(&content, PackageType::Mod)));
    }

    // Last resort: a populated mods/ folder implies an unlabeled modpack
    if let Some(entries) = client.get_folder(MODS_FOLDER, branch).await? {
        if !entries.is_empty() {
            debug!(
                repo = %client.identity().repo,
                "No manifest found but mods/ folder present, treating as modpack"
            );
            let mut metadata = PackageMetadata {
                name: client.identity().repo.clone(),
                package_type: PackageType::Modpack,
                ..PackageMetadata::default()
            };
            normalize(&mut metadata);
            return Ok((PackageType::Modpack, metadata));
        }
    }

    Ok((PackageType::Unknown, PackageMetadata::default()))
}

/// 解析行式 key = value 配置文本
///
/// `#`开头的行是注释；无法解析的行直接跳过，降级为部分元数据
/// 而不是让整个任务失败。值去除首尾空白并剥掉一层引号。
pub fn parse_conf(content: &str, package_type: PackageType) -> PackageMetadata {
    let mut metadata = PackageMetadata {
        package_type,
        ..PackageMetadata::default()
    };

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = unquote(value.trim());

        match key {
            "name" => metadata.name = value.to_string(),
            "title" => metadata.title = value.to_string(),
            "description" => metadata.description = value.to_string(),
            "author" => metadata.author = Some(value.to_string()),
            "depends" => metadata.depends = split_list(value),
            "optional_depends" => metadata.optional_depends = split_list(value),
            "min_minetest_version" | "min_luanti_version" => {
                metadata.min_version = Some(value.to_string())
            }
            "max_minetest_version" | "max_luanti_version" => {
                metadata.max_version = Some(value.to_string())
            }
            _ => {}
        }
    }

    normalize(&mut metadata);
    metadata
}

/// 逗号分隔列表：逐项去空白，空项丢弃，保持顺序
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// 剥掉一层成对的包围引号（双引号或单引号）
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// 兜底归一化
///
/// 保证name、title、description在返回的元数据中总是存在：
/// title缺失时取name，name缺失时取title，description缺失时为空串
fn normalize(metadata: &mut PackageMetadata) {
    if metadata.title.is_empty() && !metadata.name.is_empty() {
        metadata.title = metadata.name.clone();
    }
    if metadata.name.is_empty() && !metadata.title.is_empty() {
        metadata.name = metadata.title.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::host::HostType;
    use crate::hosting::traits::{FolderEntry, Release, RepoIdentity};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fake repository exposing a fixed set of files and folders
    struct StubRepo {
        identity: RepoIdentity,
        files: HashMap<&'static str, &'static str>,
        folders: HashMap<&'static str, Vec<FolderEntry>>,
    }

    impl StubRepo {
        fn new(files: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                identity: RepoIdentity {
                    base_url: "https://git.example.org".to_string(),
                    owner: "owner".to_string(),
                    repo: "stub_repo".to_string(),
                },
                files: files.into_iter().collect(),
                folders: HashMap::new(),
            }
        }

        fn with_folder(mut self, path: &'static str, names: &[&str]) -> Self {
            let entries = names
                .iter()
                .map(|n| FolderEntry {
                    name: n.to_string(),
                    path: format!("{}/{}", path, n),
                    kind: "dir".to_string(),
                })
                .collect();
            self.folders.insert(path, entries);
            self
        }
    }

    #[async_trait]
    impl RepositoryClient for StubRepo {
        fn identity(&self) -> &RepoIdentity {
            &self.identity
        }

        fn host_type(&self) -> HostType {
            HostType::GenericGit
        }

        async fn get_file(
            &self,
            path: &str,
            _branch: Option<&str>,
        ) -> Result<Option<String>, ClientError> {
            Ok(self.files.get(path).map(|s| s.to_string()))
        }

        async fn get_folder(
            &self,
            path: &str,
            _branch: Option<&str>,
        ) -> Result<Option<Vec<FolderEntry>>, ClientError> {
            Ok(self.folders.get(path).cloned())
        }

        async fn get_releases(&self) -> Result<Option<Vec<Release>>, ClientError> {
            Ok(None)
        }

        async fn get_issue_count(&self) -> Result<u64, ClientError> {
            Ok(0)
        }

        async fn get_fork_count(&self) -> Result<u64, ClientError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_game_conf_takes_precedence_over_mod_conf() {
        let repo = StubRepo::new(vec![
            ("game.conf", "name = mineclonia\ntitle = MineClonia"),
            ("mod.conf", "name = not_this_one"),
        ]);

        let (package_type, metadata) = classify(&repo, None).await.unwrap();
        assert_eq!(package_type, PackageType::Game);
        assert_eq!(metadata.name, "mineclonia");
    }

    #[tokio::test]
    async fn test_modpack_conf_beats_mod_conf() {
        let repo = StubRepo::new(vec![
            ("modpack.conf", "name = homedecor_modpack"),
            ("mod.conf", "name = not_this_one"),
        ]);

        let (package_type, metadata) = classify(&repo, None).await.unwrap();
        assert_eq!(package_type, PackageType::Modpack);
        assert_eq!(metadata.name, "homedecor_modpack");
    }

    #[tokio::test]
    async fn test_mods_folder_implies_unlabeled_modpack() {
        let repo =
            StubRepo::new(vec![]).with_folder("mods", &["mesecons", "mesecons_alias"]);

        let (package_type, metadata) = classify(&repo, None).await.unwrap();
        assert_eq!(package_type, PackageType::Modpack);
        assert_eq!(metadata.name, "stub_repo");
        assert_eq!(metadata.title, "stub_repo");
    }

    #[tokio::test]
    async fn test_nothing_found_is_unknown_with_empty_metadata() {
        let repo = StubRepo::new(vec![]);

        let (package_type, metadata) = classify(&repo, None).await.unwrap();
        assert_eq!(package_type, PackageType::Unknown);
        assert_eq!(metadata, PackageMetadata::default());
    }

    #[test]
    fn test_parse_full_mod_conf() {
        let content = r#"
# xdecor-libre manifest
name = xdecor
title = "X-Decor-libre"
description = 'A decoration mod'
author = Wuzzy
depends = default, doors,
optional_depends = farming , , unified_inventory
min_minetest_version = 5.0
max_luanti_version = 5.9
"#;
        let metadata = parse_conf(content, PackageType::Mod);

        assert_eq!(metadata.name, "xdecor");
        assert_eq!(metadata.title, "X-Decor-libre");
        assert_eq!(metadata.description, "A decoration mod");
        assert_eq!(metadata.author.as_deref(), Some("Wuzzy"));
        assert_eq!(metadata.depends, vec!["default", "doors"]);
        assert_eq!(
            metadata.optional_depends,
            vec!["farming", "unified_inventory"]
        );
        assert_eq!(metadata.min_version.as_deref(), Some("5.0"));
        assert_eq!(metadata.max_version.as_deref(), Some("5.9"));
        assert_eq!(metadata.package_type, PackageType::Mod);
    }

    #[test]
    fn test_title_only_falls_back_to_name() {
        let metadata = parse_conf("title = Foo", PackageType::Mod);
        assert_eq!(metadata.name, "Foo");
        assert_eq!(metadata.title, "Foo");
        assert_eq!(metadata.description, "");
    }

    #[test]
    fn test_name_only_falls_back_to_title() {
        let metadata = parse_conf("name = bar", PackageType::Game);
        assert_eq!(metadata.name, "bar");
        assert_eq!(metadata.title, "bar");
    }

    #[test]
    fn test_comments_and_garbage_lines_are_skipped() {
        let content = "# name = commented_out\nthis line has no equals\nname = real";
        let metadata = parse_conf(content, PackageType::Mod);
        assert_eq!(metadata.name, "real");
    }

    #[test]
    fn test_unbalanced_quotes_are_kept() {
        let metadata = parse_conf("name = \"half", PackageType::Mod);
        assert_eq!(metadata.name, "\"half");
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 包类型枚举
///
/// 表示一个仓库中托管的Luanti包的种类，
/// 由约定的配置文件（game.conf / modpack.conf / mod.conf）决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PackageType {
    /// 单个mod
    Mod,
    /// 由多个mod组成的modpack
    Modpack,
    /// 完整游戏
    Game,
    /// 未识别出任何包清单
    #[default]
    Unknown,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackageType::Mod => "mod",
            PackageType::Modpack => "modpack",
            PackageType::Game => "game",
            PackageType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PackageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mod" => Ok(PackageType::Mod),
            "modpack" => Ok(PackageType::Modpack),
            "game" => Ok(PackageType::Game),
            "unknown" => Ok(PackageType::Unknown),
            _ => Err(()),
        }
    }
}

/// 包元数据
///
/// 仅由分类器从配置文件内容产生，其他地方不手工构造。
/// 归一化保证：name、title、description在返回时总是存在
/// （可能为空字符串），即使源文件中是可选的。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// 包的内部名称
    pub name: String,
    /// 展示用标题
    pub title: String,
    /// 简短描述
    pub description: String,
    /// 作者
    pub author: Option<String>,
    /// 包类型
    pub package_type: PackageType,
    /// 硬依赖列表，保持源文件中的顺序
    pub depends: Vec<String>,
    /// 可选依赖列表，保持源文件中的顺序
    pub optional_depends: Vec<String>,
    /// 支持的最低引擎版本
    pub min_version: Option<String>,
    /// 支持的最高引擎版本
    pub max_version: Option<String>,
}

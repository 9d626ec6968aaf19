//! 調査ステップカタログ
//!
//! 固定順序の11ステップ定義と純粋な参照関数。
//! 順序が意味を持つ: 配列上の位置が「次へ」「前へ」と進捗率を決める。
//! プロセス起動時に定義され、以後変更されない。

use crate::types::PhotoType;

/// ステップ定義（カタログで不変）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDefinition {
    /// 一意なステップID
    pub id: &'static str,
    pub title: &'static str,
    /// ユーザーに提示する撮影指示
    pub instruction: &'static str,
    pub photo_type: PhotoType,
    /// ユーザー向けの合格基準（表示用）
    pub validation_checks: &'static [&'static str],
    /// trueならスキップしても提出完了性を損なわない
    pub is_conditional: bool,
}

/// 調査ステップ（固定順序）
pub const SURVEY_STEPS: &[StepDefinition] = &[
    StepDefinition {
        id: "meter-closeup",
        title: "Electricity Meter (Close-up)",
        instruction: "Get close enough so the numbers on the meter are clear and legible.",
        photo_type: PhotoType::MeterCloseup,
        validation_checks: &[
            "Image contains an electricity meter",
            "Numbers/text are visible and legible",
            "Image is sharp and not blurry",
            "Meter fills significant portion of frame",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "meter-area",
        title: "Area Around Meter (Wide Shot)",
        instruction: "Take about 10 steps back and capture a wide photo showing the entire area around the meter.",
        photo_type: PhotoType::MeterAreaWide,
        validation_checks: &[
            "Meter is visible in wider context",
            "Shows building exterior wall",
            "Includes ground and surrounding area",
            "Shows potential obstructions",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "meter-right",
        title: "Area to the RIGHT of Meter",
        instruction: "Staying where you are, please pan your camera to the right and capture the wall and any open space next to the meter.",
        photo_type: PhotoType::MeterAreaRight,
        validation_checks: &[
            "Shows exterior wall and ground space",
            "Different from previous wide shot",
            "Captures area to the right of meter",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "meter-left",
        title: "Area to the LEFT of Meter",
        instruction: "Now, please pan to the left and capture the wall and space on the other side of the meter.",
        photo_type: PhotoType::MeterAreaLeft,
        validation_checks: &[
            "Shows exterior wall and ground space",
            "Different from previous shots",
            "Captures area to the left of meter",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "adjacent-wall",
        title: "Adjacent Wall / Side Yard",
        instruction: "Take a photo from corner to corner to show the entire wall.",
        photo_type: PhotoType::AdjacentWall,
        validation_checks: &[
            "Shows long expanse of exterior wall",
            "Includes corner of house if visible",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "area-behind-fence",
        title: "Area Behind Fence (If Applicable)",
        instruction: "If there is a fence on this side of the house, please take a photo of the area behind it. Otherwise, tap \"Skip\".",
        photo_type: PhotoType::AreaBehindFence,
        validation_checks: &[
            "Fence is visible",
            "Shows space between fence and wall",
            "Image is sharp and not blurry",
        ],
        is_conditional: true,
    },
    StepDefinition {
        id: "ac-unit-label",
        title: "A/C Unit Label",
        instruction: "Find the label on your A/C unit. We need a clear, close-up photo where the 'LRA' number is readable.",
        photo_type: PhotoType::AcUnitLabel,
        validation_checks: &[
            "Contains metallic or paper label with specifications",
            "Text is readable, especially LRA/RLA numbers",
            "Label is primary subject of photo",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "second-ac-unit",
        title: "Second A/C Unit Label (If Applicable)",
        instruction: "If you have a second A/C unit, please take a photo of its label as well. If not, you can skip this.",
        photo_type: PhotoType::SecondAcUnitLabel,
        validation_checks: &[
            "Contains metallic or paper label with specifications",
            "Text is readable, especially LRA/RLA numbers",
            "Label is primary subject of photo",
        ],
        is_conditional: true,
    },
    StepDefinition {
        id: "breaker-box-interior",
        title: "Main Breaker Box (Panel Interior)",
        instruction: "Find your main breaker box. Open the metal door and take a photo of all the switches inside.",
        photo_type: PhotoType::BreakerBoxInterior,
        validation_checks: &[
            "Shows inside of electrical panel",
            "Multiple rows of breaker switches visible",
            "Entire set of breakers is visible",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "main-disconnect",
        title: "Main Disconnect Switch (Close-up)",
        instruction: "Find the main switch, usually the largest one at the top. We need a clear, close-up photo to see the number on the switch (e.g., 100, 150, or 200).",
        photo_type: PhotoType::MainDisconnectSwitch,
        validation_checks: &[
            "Focuses on single, larger breaker switch",
            "Number (100, 125, 150, 200) is visible and readable",
            "Switch is labeled as \"Main\" if applicable",
        ],
        is_conditional: false,
    },
    StepDefinition {
        id: "breaker-box-area",
        title: "Area Around Main Breaker Box",
        instruction: "Take a wide photo showing the area around the breaker box so we can see its location and any nearby obstructions.",
        photo_type: PhotoType::BreakerBoxArea,
        validation_checks: &[
            "Breaker box visible in larger context",
            "Shows location (garage wall, closet, etc.)",
            "Includes surrounding area and obstructions",
        ],
        is_conditional: false,
    },
];

/// ステップ総数
pub fn step_count() -> usize {
    SURVEY_STEPS.len()
}

/// インデックスからステップを取得
pub fn step_at(index: usize) -> Option<&'static StepDefinition> {
    SURVEY_STEPS.get(index)
}

/// IDからステップを取得
pub fn step_by_id(step_id: &str) -> Option<&'static StepDefinition> {
    SURVEY_STEPS.iter().find(|step| step.id == step_id)
}

/// IDからカタログ上の位置を取得
pub fn index_of(step_id: &str) -> Option<usize> {
    SURVEY_STEPS.iter().position(|step| step.id == step_id)
}

/// 次のステップID（最終ステップまたは未知のIDならNone）
pub fn next_step_id(current_step_id: &str) -> Option<&'static str> {
    let index = index_of(current_step_id)?;
    SURVEY_STEPS.get(index + 1).map(|step| step.id)
}

/// 前のステップID（先頭ステップまたは未知のIDならNone）
pub fn previous_step_id(current_step_id: &str) -> Option<&'static str> {
    let index = index_of(current_step_id)?;
    if index == 0 {
        return None;
    }
    SURVEY_STEPS.get(index - 1).map(|step| step.id)
}

/// 進捗（現在位置, 総数）。未知のIDは先頭扱い。
pub fn step_progress(step_id: &str) -> (usize, usize) {
    (index_of(step_id).unwrap_or(0), SURVEY_STEPS.len())
}

/// スキップ可能（条件付き）ステップのID一覧
pub fn conditional_step_ids() -> Vec<&'static str> {
    SURVEY_STEPS
        .iter()
        .filter(|step| step.is_conditional)
        .map(|step| step.id)
        .collect()
}

/// PhotoTypeから対応するステップを逆引き
pub fn step_by_photo_type(photo_type: PhotoType) -> Option<&'static StepDefinition> {
    SURVEY_STEPS.iter().find(|step| step.photo_type == photo_type)
}

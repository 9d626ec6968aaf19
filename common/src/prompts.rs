//! プロンプト生成モジュール
//!
//! 写真種別ごとの合格基準は固定テキスト。検証エンドポイントへ送る指示文を
//! ここで組み立てる。main_disconnect_switchのみアンペア数の抽出も要求する。

use crate::types::PhotoType;

/// 写真種別ごとの合格基準テキスト
pub fn criteria_text(photo_type: PhotoType) -> &'static str {
    match photo_type {
        PhotoType::MeterCloseup => "\
- Image contains an identifiable electricity meter (circular or rectangular with glass/plastic cover)
- Meter numbers/text are visible and legible
- Image is sharp and not blurry
- Meter fills significant portion of the frame",

        PhotoType::MeterAreaWide => "\
- Previously identified meter is visible within wider shot
- Shows building's exterior wall
- Includes ground and surrounding area
- Shows potential obstructions like windows, doors, utility boxes",

        PhotoType::MeterAreaRight => "\
- Shows exterior wall and adjacent ground space
- Captures area to the right of the meter location
- Different perspective from previous wide shot",

        PhotoType::MeterAreaLeft => "\
- Shows exterior wall and adjacent ground space
- Captures area to the left of the meter location
- Different perspective from previous shots",

        PhotoType::AdjacentWall => "\
- Shows long expanse of exterior wall
- Captures corner-to-corner view if possible
- Includes corner of house if visible",

        PhotoType::AreaBehindFence => "\
- Fence is visible in the image
- Shows space between fence and house wall
- Image is sharp and not blurry",

        PhotoType::AcUnitLabel => "\
- Contains a metallic or paper label with technical specifications
- Text is readable, especially LRA or RLA numbers
- Label is the primary subject of the photo",

        PhotoType::SecondAcUnitLabel => "\
- Contains a metallic or paper label with technical specifications
- Text is readable, especially LRA or RLA numbers
- Label is the primary subject of the photo
- This is for a second A/C unit (different from first)",

        PhotoType::BreakerBoxInterior => "\
- Shows inside of an electrical panel
- Multiple rows of breaker switches are visible
- Entire set of breakers is visible in frame
- Panel door is open",

        PhotoType::MainDisconnectSwitch => "\
- Focuses on single, larger breaker switch
- Number (100, 125, 150, 200) is visible and readable
- Switch may be labeled as \"Main\"
- Extract the amperage number if visible",

        PhotoType::BreakerBoxArea => "\
- Breaker box is visible within larger context
- Shows location (garage wall, closet, etc.)
- Includes surrounding area and any obstructions",
    }
}

/// 検証プロンプト生成
///
/// # Arguments
/// * `photo_type` - 検証対象の写真種別
///
/// # Returns
/// 検証エンドポイントへ送る指示文字列
pub fn build_validation_prompt(photo_type: PhotoType) -> String {
    let wants_data = photo_type.needs_data_extraction();

    let json_fields = if wants_data {
        "- isValid: boolean (true if photo meets all criteria)\n\
         - confidence: number (0-1, confidence in your assessment)\n\
         - feedback: string (specific feedback for the user)\n\
         - extractedData: object (any data you can extract from the image)"
    } else {
        "- isValid: boolean (true if photo meets all criteria)\n\
         - confidence: number (0-1, confidence in your assessment)\n\
         - feedback: string (specific feedback for the user)"
    };

    let data_extraction_note = if wants_data {
        "\n\nIf extracting data (like amperage numbers), include specific values in extractedData."
    } else {
        ""
    };

    format!(
        "You are an expert at validating home energy survey photos. Analyze this image and determine if it meets the criteria for a \"{photo_type}\" photo.\n\n\
         Return a JSON response with:\n{json_fields}\n\n\
         Criteria for {photo_type}:\n{criteria}{data_extraction_note}",
        photo_type = photo_type.as_str(),
        json_fields = json_fields,
        criteria = criteria_text(photo_type),
        data_extraction_note = data_extraction_note,
    )
}

// ==========================================
// CSV 导入核心 - 提交错误报告
// ==========================================
// 职责: 把记录库返回的字段级校验错误整理为操作员可读的消息
// 格式: 首行（目标应用 + 文件名）+ 排序后的错误（上限截断）+ 省略说明
// ==========================================

use crate::domain::ImportStage;
use crate::importer::error::ImportError;
use crate::repository::{FieldValidationErrors, RepositoryError};

/// 默认最多展示的错误条数
pub const DEFAULT_MAX_ERROR_MESSAGES: usize = 5;

/// 展开为 "[字段] 消息" 列表并排序
///
/// # 参数
/// - max_msgs: 最多保留条数；None 表示不截断
///
/// # 返回
/// - 超过上限时，末尾追加一行省略说明
pub fn retrieve_errors(errors: &FieldValidationErrors, max_msgs: Option<usize>) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .errors
        .iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("[{}] {}", field, message))
        })
        .collect();

    lines.sort();

    if let Some(max) = max_msgs {
        if max < lines.len() {
            let omitted = lines.len() - max;
            lines.truncate(max);
            lines.push(format!("以下 {} 条错误信息已省略。", omitted));
        }
    }

    lines
}

/// 错误首行
pub fn submission_lead(target: &str, file_name: &str) -> String {
    if file_name.is_empty() {
        format!("向应用(id:{})登记记录时发生错误。", target)
    } else {
        format!("向应用(id:{})登记文件[{}]的记录时发生错误。", target, file_name)
    }
}

/// 提交失败 → ImportError
///
/// - 字段级校验错误 → Submission（带上限）
/// - 其他 → Transport（SUBMIT 阶段）
pub fn compose_submission_error(
    target: &str,
    file_name: &str,
    err: RepositoryError,
    max_msgs: usize,
) -> ImportError {
    match err {
        RepositoryError::Validation(errors) => {
            let mut lines = vec![submission_lead(target, file_name)];
            lines.extend(retrieve_errors(&errors, Some(max_msgs)));

            ImportError::Submission {
                target: target.to_string(),
                file: (!file_name.is_empty()).then(|| file_name.to_string()),
                lines,
            }
        }
        other => ImportError::Transport {
            stage: ImportStage::Submit,
            target: target.to_string(),
            source: other,
        },
    }
}

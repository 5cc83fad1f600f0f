use rewind_commons::{Result, RewindError, SqlType, SqlUndoLog, TableRecords};

/// Build the undo log of one executed statement, checking that the image
/// shapes fit the operation.
///
/// | operation | before image | after image |
/// |-----------|--------------|-------------|
/// | INSERT    | empty        | non-empty   |
/// | UPDATE    | non-empty    | non-empty, same row count |
/// | DELETE    | non-empty    | empty       |
pub fn build_undo_log(
    sql_type: SqlType,
    before_image: TableRecords,
    after_image: TableRecords,
) -> Result<SqlUndoLog> {
    let shape_ok = match sql_type {
        SqlType::Insert => before_image.is_empty() && !after_image.is_empty(),
        SqlType::Update => {
            !before_image.is_empty()
                && !after_image.is_empty()
                && before_image.len() == after_image.len()
        },
        SqlType::Delete => !before_image.is_empty() && after_image.is_empty(),
    };
    if !shape_ok {
        return Err(RewindError::invariant(format!(
            "{} undo log with {} before row(s) and {} after row(s)",
            sql_type,
            before_image.len(),
            after_image.len()
        )));
    }

    let table_name = match (before_image.is_empty(), after_image.is_empty()) {
        (false, false) => {
            if !before_image
                .table_name
                .eq_ignore_ascii_case(&after_image.table_name)
            {
                return Err(RewindError::invariant(format!(
                    "before image of '{}' paired with after image of '{}'",
                    before_image.table_name, after_image.table_name
                )));
            }
            before_image.table_name.clone()
        },
        (false, true) => before_image.table_name.clone(),
        _ => after_image.table_name.clone(),
    };

    Ok(SqlUndoLog {
        sql_type,
        table_name,
        before_image,
        after_image,
    })
}

use crate::rectangle::Rectangle;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// 流文件读取错误类型
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// 读取流文件,返回其中的点记录
///
/// 每行一条记录,空白分隔:`TYPE ID X Y ...`。只消费TYPE为`E`的行,
/// ID和坐标按整数解析,行尾多余字段忽略。每条记录产出一个点矩形
/// `(X, Y)-(X, Y)`。
pub fn read_stream_file<P: AsRef<Path>>(path: P) -> Result<Vec<Rectangle>, StreamError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut points = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();

        match fields.next() {
            Some("E") => {}
            _ => continue,
        }

        let line_number = index + 1;
        let mut next_int = |name: &str| -> Result<i64, StreamError> {
            let field = fields.next().ok_or_else(|| StreamError::Parse {
                line: line_number,
                reason: format!("missing {} field", name),
            })?;
            field.parse::<i64>().map_err(|_| StreamError::Parse {
                line: line_number,
                reason: format!("{} is not an integer: {:?}", name, field),
            })
        };

        let id = next_int("id")?;
        let x = next_int("x")?;
        let y = next_int("y")?;

        points.push(Rectangle::from_point(id as i32, vec![x as f32, y as f32]));
    }

    Ok(points)
}

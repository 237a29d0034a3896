// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{common::error::AppError, models::report::SessionReport};

const FONT_FAMILY: &str = "Roboto";

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self { fonts_dir: fonts_dir.into() }
    }

    /// Renderiza o relatório da sessão em PDF.
    /// `panel_url`, se houver, vira um QR code apontando para o painel do cliente.
    pub fn render_session_pdf(&self, report: &SessionReport, panel_url: Option<&str>) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada (Roboto-Regular.ttf, Roboto-Bold.ttf...)
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_FAMILY, None)
            .map_err(|_| {
                AppError::FontNotFound(format!(
                    "Fonte {} não encontrada em {}",
                    FONT_FAMILY,
                    self.fonts_dir.display()
                ))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Relatório - {}", report.client_name));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(elements::Paragraph::new("RELATÓRIO DE TRABALHO")
            .styled(style::Style::new().bold().with_font_size(18)));
        doc.push(elements::Paragraph::new(format!("Cliente: {}", report.client_name))
            .styled(style::Style::new().with_font_size(12)));
        doc.push(elements::Paragraph::new(format!("Data: {}", report.date)));
        doc.push(elements::Break::new(1.5));

        // --- TEMPO E ROTA ---
        let mut table = elements::TableLayout::new(vec![1, 1]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let rows = [
            ("Início", report.start.clone()),
            ("Término", report.end.clone()),
            ("Tempo total", report.duration.clone()),
            ("Pontos da rota", report.route_points.to_string()),
            ("Distância", report.distance.clone()),
            ("Fotos", report.photo_count.to_string()),
            ("Status", report.status.clone()),
        ];
        let style_bold = style::Style::new().bold();
        for (label, value) in rows {
            table.row()
                .element(elements::Paragraph::new(label).styled(style_bold))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- FOTOS ---
        doc.push(elements::Paragraph::new("Documentação fotográfica")
            .styled(style::Style::new().bold().with_font_size(14)));

        if report.photos.is_empty() {
            doc.push(elements::Paragraph::new("Nenhuma foto nesta sessão")
                .styled(style::Style::new().italic()));
        } else {
            let mut photos = elements::TableLayout::new(vec![4, 1, 3]);
            photos.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
            photos.row()
                .element(elements::Paragraph::new("Descrição").styled(style_bold))
                .element(elements::Paragraph::new("Hora").styled(style_bold))
                .element(elements::Paragraph::new("Local").styled(style_bold))
                .push()
                .map_err(pdf_error)?;

            for photo in &report.photos {
                photos.row()
                    .element(elements::Paragraph::new(photo.description.as_str()))
                    .element(elements::Paragraph::new(photo.time.as_str()))
                    .element(elements::Paragraph::new(photo.location.as_str()))
                    .push()
                    .map_err(pdf_error)?;
            }
            doc.push(photos);
        }

        if let Some(notes) = &report.notes {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new("Notas do trabalhador")
                .styled(style::Style::new().bold().with_font_size(12)));
            doc.push(elements::Paragraph::new(notes.as_str()));
        }

        // --- QR CODE PARA O PAINEL ---
        if let Some(url) = panel_url {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new("Acompanhe no painel do cliente:")
                .styled(style::Style::new().with_font_size(10)));

            let code = QrCode::new(url.as_bytes()).map_err(pdf_error)?;
            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(pdf_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));
            doc.push(pdf_image);
        }

        // --- RODAPÉ ---
        doc.push(elements::Break::new(2));
        let mut footer = elements::Paragraph::new(format!("Gerado em: {}", report.generated_at));
        footer.set_alignment(genpdf::Alignment::Right);
        doc.push(footer.styled(style::Style::new().italic().with_font_size(8)));

        // Renderiza para buffer em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        tracing::debug!("🖨️ PDF da sessão {} gerado ({} bytes)", report.session_id, buffer.len());
        Ok(buffer)
    }
}

fn pdf_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}
